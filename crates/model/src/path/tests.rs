use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

use super::{ModelPath, PathError};

fn path(s: &str) -> ModelPath {
	ModelPath::parse(s).expect("valid path")
}

#[test]
fn child_and_parent_are_inverse() {
	let tasks = path("tasks");
	let compile = tasks.child("compile");
	assert_eq!(compile, path("tasks.compile"));
	assert_eq!(compile.parent(), Some(tasks));
	assert_eq!(compile.name(), Some("compile"));
	assert_eq!(compile.depth(), 2);
}

#[test]
fn root_has_no_parent_or_name() {
	let root = ModelPath::root();
	assert!(root.is_root());
	assert_eq!(root.parent(), None);
	assert_eq!(root.name(), None);
	assert_eq!(path("a").parent(), Some(root));
}

#[test]
fn ancestry_is_strict() {
	let a = path("a");
	let abc = path("a.b.c");
	assert!(a.is_ancestor_of(&abc));
	assert!(!abc.is_ancestor_of(&a));
	assert!(!a.is_ancestor_of(&a));
	assert!(!path("ab").is_ancestor_of(&path("a.b")));
	assert!(ModelPath::root().is_ancestor_of(&a));
	assert!(path("a.b").is_direct_child_of(&a));
	assert!(!abc.is_direct_child_of(&a));
}

#[test]
fn ancestors_are_nearest_first() {
	let ancestors: Vec<_> = path("a.b.c").ancestors().map(|p| p.to_string()).collect();
	assert_eq!(ancestors, vec!["a.b".to_string(), "a".to_string()]);
}

#[rstest]
#[case("a..b")]
#[case(".a")]
#[case("a.")]
fn empty_segments_are_rejected(#[case] text: &str) {
	assert!(matches!(ModelPath::parse(text), Err(PathError::EmptySegment { .. })));
}

#[rstest]
#[case("1abc", '1')]
#[case("-x", '-')]
fn illegal_first_characters_are_rejected(#[case] name: &str, #[case] ch: char) {
	assert_eq!(
		ModelPath::root().try_child(name),
		Err(PathError::IllegalFirstCharacter {
			segment: name.to_string(),
			ch
		})
	);
}

#[test]
fn illegal_inner_characters_are_rejected() {
	assert!(matches!(
		ModelPath::parse("tasks.com pile"),
		Err(PathError::IllegalCharacter { ch: ' ', .. })
	));
}

#[test]
fn display_and_debug() {
	assert_eq!(path("a.b-c.d_e").to_string(), "a.b-c.d_e");
	assert_eq!(format!("{:?}", path("a.b")), "ModelPath(a.b)");
	assert_eq!(ModelPath::root().to_string(), "<root>");
}

proptest! {
	#[test]
	fn parse_display_agree(segments in prop::collection::vec("[a-z_][a-z0-9_-]{0,8}", 1..6)) {
		let joined = segments.join(".");
		let parsed = ModelPath::parse(&joined).unwrap();
		prop_assert_eq!(parsed.depth(), segments.len());
		prop_assert_eq!(parsed.to_string(), joined);
		let rebuilt = ModelPath::from_segments(&segments).unwrap();
		prop_assert_eq!(rebuilt, parsed);
	}
}
