use std::borrow::Cow;

use pretty_assertions::assert_eq;

use super::{BuildProperties, PropertiesError, PropertiesLoader, PropertyMap};

fn map(entries: &[(&str, &str)]) -> PropertyMap {
	entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn overrides_win_over_defaults() {
	let props = BuildProperties::new(
		map(&[("version", "1.0"), ("group", "org.example")]),
		map(&[("version", "2.0")]),
	);
	assert_eq!(props.find("version"), Some("2.0"));
	assert_eq!(props.find("group"), Some("org.example"));
	assert_eq!(props.find("missing"), None);
}

#[test]
fn extras_sit_between_defaults_and_overrides() {
	let props = BuildProperties::new(map(&[("a", "default"), ("b", "default")]), map(&[("b", "override")]));
	let merged = props.merge_properties(&map(&[("a", "extra"), ("b", "extra"), ("c", "extra")]));
	assert_eq!(
		merged.into_owned(),
		map(&[("a", "extra"), ("b", "override"), ("c", "extra")])
	);
}

#[test]
fn empty_extras_borrow_the_cached_view() {
	let props = BuildProperties::new(map(&[("a", "1")]), PropertyMap::new());
	assert!(matches!(props.merge_properties(&PropertyMap::new()), Cow::Borrowed(_)));
}

#[test]
fn updating_overrides_remerges() {
	let mut props = BuildProperties::new(map(&[("a", "1"), ("b", "1")]), map(&[("a", "2")]));
	props.update_overrides(map(&[("b", "3"), ("c", "4")]));
	assert_eq!(props.properties(), &map(&[("a", "2"), ("b", "3"), ("c", "4")]));
	assert_eq!(props.defaults(), &map(&[("a", "1"), ("b", "1")]));
}

#[test]
fn toml_is_flattened() {
	let parsed = PropertiesLoader::parse_toml(
		r#"
version = "1.2"
parallel = true
workers = 4

[org.jvm]
args = "-Xmx2g"
"#,
	)
	.unwrap();
	assert_eq!(
		parsed,
		map(&[
			("org.jvm.args", "-Xmx2g"),
			("parallel", "true"),
			("version", "1.2"),
			("workers", "4"),
		])
	);
}

#[test]
fn arrays_are_rejected() {
	let err = PropertiesLoader::parse_toml("targets = [1, 2]").unwrap_err();
	assert!(matches!(err, PropertiesError::Unsupported { ref name, kind: "array" } if name == "targets"), "got {err:?}");
}

#[test]
fn env_overrides_use_prefix() {
	let loader = PropertiesLoader::new();
	let overrides = loader.env_overrides([
		("CAIRN_PROJECT_version", "3.0"),
		("CAIRN_PROJECT_", "ignored"),
		("PATH", "/usr/bin"),
	]);
	assert_eq!(overrides, map(&[("version", "3.0")]));

	let custom = PropertiesLoader::new().with_env_prefix("X_");
	assert_eq!(custom.env_overrides([("X_a", "1")]), map(&[("a", "1")]));
}

#[test]
fn load_combines_file_and_environment() {
	let dir = tempfile::tempdir().unwrap();
	let file = dir.path().join("cairn.toml");
	std::fs::write(&file, "version = \"1.0\"\ngroup = \"g\"\n").unwrap();

	let props = PropertiesLoader::new()
		.load(Some(file.as_path()), [("CAIRN_PROJECT_version", "2.0")])
		.unwrap();
	assert_eq!(props.find("version"), Some("2.0"));
	assert_eq!(props.find("group"), Some("g"));
}

#[test]
fn missing_file_yields_no_defaults() {
	let dir = tempfile::tempdir().unwrap();
	let props = PropertiesLoader::new()
		.load(Some(dir.path().join("absent.toml").as_path()), std::iter::empty::<(String, String)>())
		.unwrap();
	assert!(props.properties().is_empty());
}
