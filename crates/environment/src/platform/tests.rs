use std::collections::BTreeMap;

use cairn_model::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::{Architecture, OperatingSystem, PlatformError, PlatformFacts};

#[rstest]
#[case("x86", Architecture::X86)]
#[case("amd64", Architecture::X86_64)]
#[case("X86_64", Architecture::X86_64)]
#[case("aarch64", Architecture::Aarch64)]
#[case("arm64", Architecture::Aarch64)]
#[case("ppc64", Architecture::Ppc64)]
#[case("powerpc64", Architecture::Ppc64)]
#[case("ppc64le", Architecture::Ppc64le)]
#[case("s390x", Architecture::S390x)]
#[case("sparcv9", Architecture::SparcV9)]
#[case("sparc64", Architecture::SparcV9)]
fn architecture_names(#[case] name: &str, #[case] expected: Architecture) {
	assert_eq!(Architecture::from_name(name), Ok(expected));
}

#[test]
fn unknown_architecture_is_rejected() {
	assert_eq!(
		Architecture::from_name("mips"),
		Err(PlatformError::UnhandledArchitecture("mips".to_string()))
	);
	assert_eq!(
		Architecture::from_name("mips").unwrap_err().to_string(),
		"unhandled system architecture: mips"
	);
}

#[test]
fn canonical_names_parse_back() {
	for arch in Architecture::ALL {
		assert_eq!(arch.as_str().parse::<Architecture>(), Ok(arch));
	}
}

#[test]
fn operating_system_names() {
	assert_eq!(OperatingSystem::from_name("linux"), OperatingSystem::Linux);
	assert_eq!(OperatingSystem::from_name("Mac OS X"), OperatingSystem::MacOs);
	assert_eq!(
		OperatingSystem::from_name("haiku"),
		OperatingSystem::Other("haiku".to_string())
	);
	assert_eq!(OperatingSystem::from_name("haiku").as_str(), "haiku");
}

#[test]
fn facts_become_a_map() {
	let facts = PlatformFacts::new(OperatingSystem::Linux, Architecture::X86_64);
	let mut expected = BTreeMap::new();
	expected.insert("arch".to_string(), Value::from("x86_64"));
	expected.insert("os".to_string(), Value::from("linux"));
	assert_eq!(Value::from(facts), Value::Map(expected));
}
