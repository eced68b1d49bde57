//! Registry configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default nesting limit for rule realization within one request.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tunables for a [`crate::ModelRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct RegistryConfig {
	/// Maximum number of nested rule executions within one request.
	pub max_depth: usize,
	/// Whether failures are counted for the end-of-build problem summary.
	pub record_problems: bool,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			record_problems: true,
		}
	}
}

/// Configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid model configuration: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("max-depth must be at least 1")]
	ZeroDepth,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
	#[serde(default)]
	model: RegistryConfig,
}

impl RegistryConfig {
	/// Parses the `[model]` table of a TOML document. Missing keys keep
	/// their defaults; a document without the table yields the defaults.
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		let document: ConfigDocument = toml::from_str(text)?;
		document.model.validated()
	}

	/// Reads and parses a TOML file.
	pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&text)
	}

	fn validated(self) -> Result<Self, ConfigError> {
		if self.max_depth == 0 {
			return Err(ConfigError::ZeroDepth);
		}
		Ok(self)
	}
}
