//! Host platform facts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use cairn_model::Value;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
	#[error("unhandled system architecture: {0}")]
	UnhandledArchitecture(String),
}

/// Processor architecture a build runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
	X86,
	X86_64,
	Aarch64,
	Ppc64,
	Ppc64le,
	S390x,
	SparcV9,
}

impl Architecture {
	pub const ALL: [Architecture; 7] = [
		Architecture::X86,
		Architecture::X86_64,
		Architecture::Aarch64,
		Architecture::Ppc64,
		Architecture::Ppc64le,
		Architecture::S390x,
		Architecture::SparcV9,
	];

	/// Resolves a JVM-style or Rust target architecture name, ignoring case.
	pub fn from_name(name: &str) -> Result<Self, PlatformError> {
		let arch = match name.to_ascii_lowercase().as_str() {
			"x86" | "i386" | "i686" => Architecture::X86,
			"amd64" | "x86_64" => Architecture::X86_64,
			"aarch64" | "arm64" => Architecture::Aarch64,
			"ppc64" | "powerpc64" => Architecture::Ppc64,
			"ppc64le" | "powerpc64le" => Architecture::Ppc64le,
			"s390x" => Architecture::S390x,
			"sparcv9" | "sparc64" => Architecture::SparcV9,
			_ => return Err(PlatformError::UnhandledArchitecture(name.to_string())),
		};
		Ok(arch)
	}

	/// Architecture of the compile target.
	///
	/// Rust reports little-endian 64-bit PowerPC as `powerpc64` too, so the
	/// target endianness decides between [`Architecture::Ppc64`] and
	/// [`Architecture::Ppc64le`].
	pub fn current() -> Result<Self, PlatformError> {
		match Self::from_name(std::env::consts::ARCH)? {
			Architecture::Ppc64 if cfg!(target_endian = "little") => Ok(Architecture::Ppc64le),
			arch => Ok(arch),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Architecture::X86 => "x86",
			Architecture::X86_64 => "x86_64",
			Architecture::Aarch64 => "aarch64",
			Architecture::Ppc64 => "ppc64",
			Architecture::Ppc64le => "ppc64le",
			Architecture::S390x => "s390x",
			Architecture::SparcV9 => "sparcv9",
		}
	}
}

impl fmt::Display for Architecture {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Architecture {
	type Err = PlatformError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_name(s)
	}
}

/// Operating system family a build runs on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
	Linux,
	MacOs,
	Windows,
	FreeBsd,
	Solaris,
	Other(String),
}

impl OperatingSystem {
	/// Resolves a Rust target OS name. Unrecognized names are kept verbatim.
	pub fn from_name(name: &str) -> Self {
		match name.to_ascii_lowercase().as_str() {
			"linux" => OperatingSystem::Linux,
			"macos" | "darwin" | "mac os x" => OperatingSystem::MacOs,
			"windows" => OperatingSystem::Windows,
			"freebsd" => OperatingSystem::FreeBsd,
			"solaris" | "illumos" => OperatingSystem::Solaris,
			_ => OperatingSystem::Other(name.to_string()),
		}
	}

	/// Operating system of the compile target.
	pub fn current() -> Self {
		Self::from_name(std::env::consts::OS)
	}

	pub fn as_str(&self) -> &str {
		match self {
			OperatingSystem::Linux => "linux",
			OperatingSystem::MacOs => "macos",
			OperatingSystem::Windows => "windows",
			OperatingSystem::FreeBsd => "freebsd",
			OperatingSystem::Solaris => "solaris",
			OperatingSystem::Other(name) => name,
		}
	}
}

impl fmt::Display for OperatingSystem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Platform facts bound into the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformFacts {
	pub os: OperatingSystem,
	pub arch: Architecture,
}

impl PlatformFacts {
	pub fn new(os: OperatingSystem, arch: Architecture) -> Self {
		Self { os, arch }
	}

	/// Facts of the compile target.
	pub fn current() -> Result<Self, PlatformError> {
		Ok(Self::new(OperatingSystem::current(), Architecture::current()?))
	}

	/// Map value with `os` and `arch` string entries.
	pub fn to_value(&self) -> Value {
		let mut map = BTreeMap::new();
		map.insert("arch".to_string(), Value::from(self.arch.as_str()));
		map.insert("os".to_string(), Value::from(self.os.as_str()));
		Value::Map(map)
	}
}

impl From<PlatformFacts> for Value {
	fn from(facts: PlatformFacts) -> Self {
		facts.to_value()
	}
}
