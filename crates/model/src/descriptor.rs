//! Human-readable rule identity used for diagnostics.

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Identity of a registered rule.
///
/// Descriptors carry no behavior. They exist so failures can name the
/// rules that produced them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum RuleDescriptor {
	/// Free-form label, e.g. `"java plugin: sourceSets"`.
	Label(Arc<str>),
	/// Source location the rule was declared at.
	Source {
		file: &'static str,
		line: u32,
		column: u32,
	},
	/// A rule declared on behalf of another rule.
	Nested {
		parent: Arc<RuleDescriptor>,
		child: Arc<str>,
	},
}

impl RuleDescriptor {
	pub fn label(label: impl Into<Arc<str>>) -> Self {
		RuleDescriptor::Label(label.into())
	}

	/// Describes the caller's source location.
	#[track_caller]
	pub fn caller() -> Self {
		let location = Location::caller();
		RuleDescriptor::Source {
			file: location.file(),
			line: location.line(),
			column: location.column(),
		}
	}

	/// Derives a descriptor for a rule declared by `self`.
	pub fn nested(&self, child: impl Into<Arc<str>>) -> Self {
		RuleDescriptor::Nested {
			parent: Arc::new(self.clone()),
			child: child.into(),
		}
	}
}

impl fmt::Display for RuleDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RuleDescriptor::Label(label) => f.write_str(label),
			RuleDescriptor::Source { file, line, column } => write!(f, "{file}:{line}:{column}"),
			RuleDescriptor::Nested { parent, child } => write!(f, "{parent} > {child}"),
		}
	}
}

impl fmt::Debug for RuleDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RuleDescriptor({self})")
	}
}

impl From<&str> for RuleDescriptor {
	fn from(label: &str) -> Self {
		RuleDescriptor::label(label)
	}
}

impl From<String> for RuleDescriptor {
	fn from(label: String) -> Self {
		RuleDescriptor::label(label)
	}
}

/// Ordered rule descriptors, innermost first.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RuleChain(Vec<RuleDescriptor>);

impl RuleChain {
	pub fn new(innermost_first: Vec<RuleDescriptor>) -> Self {
		Self(innermost_first)
	}

	/// The rule that failed or closed a cycle.
	pub fn innermost(&self) -> Option<&RuleDescriptor> {
		self.0.first()
	}

	pub fn outermost(&self) -> Option<&RuleDescriptor> {
		self.0.last()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn contains(&self, descriptor: &RuleDescriptor) -> bool {
		self.0.contains(descriptor)
	}

	pub fn iter(&self) -> impl Iterator<Item = &RuleDescriptor> {
		self.0.iter()
	}

	pub fn as_slice(&self) -> &[RuleDescriptor] {
		&self.0
	}
}

impl fmt::Display for RuleChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0.is_empty() {
			return f.write_str("<no active rule>");
		}
		for (i, descriptor) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(" <- ")?;
			}
			write!(f, "{descriptor}")?;
		}
		Ok(())
	}
}

impl fmt::Debug for RuleChain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.0.iter()).finish()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::{RuleChain, RuleDescriptor};

	#[test]
	fn caller_captures_this_file() {
		let descriptor = RuleDescriptor::caller();
		let RuleDescriptor::Source { file, line, .. } = descriptor else {
			panic!("expected a source descriptor");
		};
		assert!(file.ends_with("descriptor.rs"), "got {file}");
		assert!(line > 0);
	}

	#[test]
	fn nested_display() {
		let parent = RuleDescriptor::label("java plugin");
		assert_eq!(parent.nested("sourceSets").to_string(), "java plugin > sourceSets");
	}

	#[test]
	fn chain_display_is_innermost_first() {
		let chain = RuleChain::new(vec!["b".into(), "a".into()]);
		assert_eq!(chain.to_string(), "b <- a");
		assert_eq!(chain.innermost(), Some(&RuleDescriptor::label("b")));
		assert_eq!(chain.outermost(), Some(&RuleDescriptor::label("a")));
		assert_eq!(RuleChain::default().to_string(), "<no active rule>");
	}
}
