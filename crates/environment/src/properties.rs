//! Layered build properties.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(test)]
mod tests;

/// Property name to value.
pub type PropertyMap = BTreeMap<String, String>;

/// Environment variable prefix marking a property override.
pub const DEFAULT_ENV_PREFIX: &str = "CAIRN_PROJECT_";

/// Properties loading failures.
#[derive(Debug, thiserror::Error)]
pub enum PropertiesError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("invalid properties file: {0}")]
	Parse(#[from] toml::de::Error),
	#[error("property {name} has unsupported {kind} value")]
	Unsupported { name: String, kind: &'static str },
}

/// Merged view over default and override properties.
///
/// Precedence is `defaults <- extra <- overrides`: overrides always win, and
/// caller-supplied extras win over defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildProperties {
	defaults: PropertyMap,
	overrides: PropertyMap,
	merged: PropertyMap,
}

impl BuildProperties {
	pub fn new(defaults: PropertyMap, overrides: PropertyMap) -> Self {
		let merged = merge(&defaults, &PropertyMap::new(), &overrides);
		Self {
			defaults,
			overrides,
			merged,
		}
	}

	/// Looks up a merged property.
	pub fn find(&self, name: &str) -> Option<&str> {
		self.merged.get(name).map(String::as_str)
	}

	/// Merges `extra` between defaults and overrides.
	///
	/// Borrows the cached view when `extra` is empty.
	pub fn merge_properties(&self, extra: &PropertyMap) -> Cow<'_, PropertyMap> {
		if extra.is_empty() {
			Cow::Borrowed(&self.merged)
		} else {
			Cow::Owned(merge(&self.defaults, extra, &self.overrides))
		}
	}

	/// Adds overrides, replacing existing ones with the same name.
	pub fn update_overrides(&mut self, overrides: PropertyMap) {
		tracing::debug!(count = overrides.len(), "properties.update-overrides");
		self.overrides.extend(overrides);
		self.merged = merge(&self.defaults, &PropertyMap::new(), &self.overrides);
	}

	/// The merged properties.
	pub fn properties(&self) -> &PropertyMap {
		&self.merged
	}

	pub fn defaults(&self) -> &PropertyMap {
		&self.defaults
	}

	pub fn overrides(&self) -> &PropertyMap {
		&self.overrides
	}
}

fn merge(defaults: &PropertyMap, extra: &PropertyMap, overrides: &PropertyMap) -> PropertyMap {
	let mut merged = defaults.clone();
	merged.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
	merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
	merged
}

/// Reads defaults from a TOML file and overrides from environment variables.
#[derive(Debug, Clone)]
pub struct PropertiesLoader {
	env_prefix: String,
}

impl Default for PropertiesLoader {
	fn default() -> Self {
		Self {
			env_prefix: DEFAULT_ENV_PREFIX.to_string(),
		}
	}
}

impl PropertiesLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Uses `prefix` instead of [`DEFAULT_ENV_PREFIX`].
	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub fn env_prefix(&self) -> &str {
		&self.env_prefix
	}

	/// Flattens a TOML document into properties.
	///
	/// Scalars become strings and nested tables join their keys with `.`.
	/// Arrays are rejected.
	pub fn parse_toml(text: &str) -> Result<PropertyMap, PropertiesError> {
		let table: toml::Table = toml::from_str(text)?;
		let mut out = PropertyMap::new();
		flatten_into(&mut out, None, &table)?;
		Ok(out)
	}

	/// Reads a properties file. A missing file yields no properties.
	pub fn read_file(path: &Path) -> Result<PropertyMap, PropertiesError> {
		match std::fs::read_to_string(path) {
			Ok(text) => Self::parse_toml(&text),
			Err(err) if err.kind() == io::ErrorKind::NotFound => {
				tracing::trace!(path = %path.display(), "properties.file.missing");
				Ok(PropertyMap::new())
			}
			Err(source) => Err(PropertiesError::Io {
				path: path.to_path_buf(),
				source,
			}),
		}
	}

	/// Collects overrides from `vars`, keeping those that carry the prefix.
	pub fn env_overrides<I, K, V>(&self, vars: I) -> PropertyMap
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		vars.into_iter()
			.filter_map(|(key, value)| {
				let name = key.as_ref().strip_prefix(self.env_prefix.as_str())?;
				(!name.is_empty()).then(|| (name.to_string(), value.into()))
			})
			.collect()
	}

	/// Loads defaults from `file` (if any) and overrides from `vars`.
	pub fn load<I, K, V>(&self, file: Option<&Path>, vars: I) -> Result<BuildProperties, PropertiesError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		let defaults = match file {
			Some(path) => Self::read_file(path)?,
			None => PropertyMap::new(),
		};
		let overrides = self.env_overrides(vars);
		tracing::debug!(defaults = defaults.len(), overrides = overrides.len(), "properties.load");
		Ok(BuildProperties::new(defaults, overrides))
	}

	/// Like [`PropertiesLoader::load`], reading the process environment.
	pub fn load_from_env(&self, file: Option<&Path>) -> Result<BuildProperties, PropertiesError> {
		self.load(file, std::env::vars())
	}
}

fn flatten_into(out: &mut PropertyMap, prefix: Option<&str>, table: &toml::Table) -> Result<(), PropertiesError> {
	for (key, value) in table {
		let name = match prefix {
			Some(prefix) => format!("{prefix}.{key}"),
			None => key.clone(),
		};
		let text = match value {
			toml::Value::String(s) => s.clone(),
			toml::Value::Integer(i) => i.to_string(),
			toml::Value::Float(f) => f.to_string(),
			toml::Value::Boolean(b) => b.to_string(),
			toml::Value::Datetime(d) => d.to_string(),
			toml::Value::Table(nested) => {
				flatten_into(out, Some(&name), nested)?;
				continue;
			}
			toml::Value::Array(_) => {
				return Err(PropertiesError::Unsupported {
					name,
					kind: value.type_str(),
				});
			}
		};
		out.insert(name, text);
	}
	Ok(())
}
