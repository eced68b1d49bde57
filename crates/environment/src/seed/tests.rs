use cairn_model::{LifecycleState, ModelError, ModelPath, ModelRegistry, ModelRule, Value};
use pretty_assertions::assert_eq;

use super::{seed_platform, seed_properties};
use crate::platform::{Architecture, OperatingSystem, PlatformFacts};
use crate::properties::{BuildProperties, PropertyMap};

fn path(s: &str) -> ModelPath {
	ModelPath::parse(s).unwrap()
}

fn properties(entries: &[(&str, &str)]) -> BuildProperties {
	let defaults: PropertyMap = entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
	BuildProperties::new(defaults, PropertyMap::new())
}

#[test]
fn properties_become_closed_string_nodes() {
	let registry = ModelRegistry::new();
	let count = seed_properties(&registry, &path("props"), &properties(&[("version", "1.0"), ("org.jvm.args", "-Xmx1g")])).unwrap();

	assert_eq!(count, 2);
	assert_eq!(registry.state(&path("props.version")), Some(LifecycleState::Closed));
	assert_eq!(
		registry.get(&path("props.org.jvm.args"), LifecycleState::Closed).unwrap(),
		Value::from("-Xmx1g")
	);
	assert_eq!(registry.children(&path("props")), vec![path("props.org"), path("props.version")]);
}

#[test]
fn rules_consume_seeded_properties() {
	let registry = ModelRegistry::new();
	seed_properties(&registry, &path("props"), &properties(&[("version", "1.0")])).unwrap();
	registry
		.register(
			ModelRule::creator(path("artifact"), "artifact", |scope| {
				Ok(format!("lib-{}.jar", scope.input_as::<String>(0)?))
			})
			.input(path("props.version"), LifecycleState::Closed),
		)
		.unwrap();
	assert_eq!(
		registry.get(&path("artifact"), LifecycleState::Created).unwrap(),
		Value::from("lib-1.0.jar")
	);
}

#[test]
fn invalid_property_names_are_rejected() {
	let registry = ModelRegistry::new();
	let err = seed_properties(&registry, &path("props"), &properties(&[("bad..name", "x")])).unwrap_err();
	assert!(matches!(err, ModelError::Path(_)), "got {err:?}");
}

#[test]
fn seeding_platform_twice_is_a_duplicate() {
	let registry = ModelRegistry::new();
	let facts = PlatformFacts::new(OperatingSystem::Linux, Architecture::Aarch64);
	seed_platform(&registry, &path("platform"), &facts).unwrap();

	let value = registry.get(&path("platform"), LifecycleState::Closed).unwrap();
	assert_eq!(value.as_map().and_then(|m| m.get("arch")), Some(&Value::from("aarch64")));

	let err = seed_platform(&registry, &path("platform"), &facts).unwrap_err();
	assert!(matches!(err, ModelError::DuplicateBinding { .. }), "got {err:?}");
}

#[test]
fn invalid_name_seeds_nothing() {
	let registry = ModelRegistry::new();
	let err = seed_properties(&registry, &path("props"), &properties(&[("alpha", "1"), ("beta.2fa", "on")])).unwrap_err();
	assert!(matches!(err, ModelError::Path(_)), "got {err:?}");
	assert!(registry.is_empty());

	let count = seed_properties(&registry, &path("props"), &properties(&[("alpha", "1"), ("beta.mfa", "on")])).unwrap();
	assert_eq!(count, 2);
	assert_eq!(registry.get(&path("props.alpha"), LifecycleState::Closed).unwrap(), Value::from("1"));
}
