//! Binding collaborator facts into a registry.

use cairn_model::{ModelError, ModelPath, ModelRegistry, RuleDescriptor};

use crate::platform::PlatformFacts;
use crate::properties::{BuildProperties, PropertyMap};

#[cfg(test)]
mod tests;

/// Seeds every merged property as a string node under `base`.
///
/// Property names are split on `.` into path segments, so `org.jvm.args`
/// under `props` lands at `props.org.jvm.args`. Returns the number of
/// seeded nodes.
///
/// Nothing is seeded if any property name is not a valid path.
pub fn seed_properties(registry: &ModelRegistry, base: &ModelPath, properties: &BuildProperties) -> Result<usize, ModelError> {
	let descriptor = RuleDescriptor::label("build properties");
	let merged: &PropertyMap = properties.properties();
	let paths = merged
		.keys()
		.map(|name| {
			name.split('.')
				.try_fold(base.clone(), |path, segment| path.try_child(segment))
		})
		.collect::<Result<Vec<_>, _>>()?;
	for (path, (name, value)) in paths.iter().zip(merged) {
		registry.seed_with(path, value.as_str(), descriptor.nested(name.as_str()))?;
	}
	tracing::debug!(base = %base, count = merged.len(), "environment.seed-properties");
	Ok(merged.len())
}

/// Seeds `facts` as a map node at `path`.
pub fn seed_platform(registry: &ModelRegistry, path: &ModelPath, facts: &PlatformFacts) -> Result<(), ModelError> {
	registry.seed_with(path, facts.to_value(), RuleDescriptor::label("platform facts"))?;
	tracing::debug!(path = %path, os = %facts.os, arch = %facts.arch, "environment.seed-platform");
	Ok(())
}
