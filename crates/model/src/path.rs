//! Hierarchical model element paths.
//!
//! A [`ModelPath`] is an immutable sequence of name segments joined by
//! [`SEPARATOR`]. Paths are the sole key into the node table, so equality,
//! hashing and ordering are all structural over the segments.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Separator between path segments in textual form.
pub const SEPARATOR: char = '.';

/// Rejected path or segment syntax.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
	#[error("model element name cannot be empty (in {path:?})")]
	EmptySegment { path: String },
	#[error("model element name {segment:?} has illegal first character {ch:?} (names must start with an ASCII letter or underscore)")]
	IllegalFirstCharacter { segment: String, ch: char },
	#[error("model element name {segment:?} contains illegal character {ch:?} (only ASCII letters, digits, '_' and '-' are allowed)")]
	IllegalCharacter { segment: String, ch: char },
}

/// Identifier of one model element.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelPath {
	segments: Arc<[Box<str>]>,
}

impl ModelPath {
	/// Returns the empty path at the top of the element tree.
	///
	/// The root is never a node itself; top-level elements have it as their
	/// implicit parent.
	pub fn root() -> Self {
		Self {
			segments: Arc::from(Vec::<Box<str>>::new()),
		}
	}

	/// Parses a dotted path such as `tasks.compile.options`.
	///
	/// The empty string parses to [`ModelPath::root`].
	pub fn parse(text: &str) -> Result<Self, PathError> {
		if text.is_empty() {
			return Ok(Self::root());
		}
		let mut segments = Vec::new();
		for segment in text.split(SEPARATOR) {
			validate_name(segment).map_err(|err| match err {
				PathError::EmptySegment { .. } => PathError::EmptySegment { path: text.to_string() },
				other => other,
			})?;
			segments.push(Box::from(segment));
		}
		Ok(Self {
			segments: Arc::from(segments),
		})
	}

	/// Builds a path from already validated segments.
	pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut out = Vec::new();
		for segment in segments {
			let segment = segment.as_ref();
			validate_name(segment)?;
			out.push(Box::from(segment));
		}
		Ok(Self { segments: Arc::from(out) })
	}

	/// Derives the path of a direct child.
	///
	/// The name is taken verbatim. Use [`ModelPath::try_child`] for names from
	/// untrusted input.
	pub fn child(&self, name: &str) -> Self {
		let mut segments: Vec<Box<str>> = self.segments.to_vec();
		segments.push(Box::from(name));
		Self {
			segments: Arc::from(segments),
		}
	}

	/// Derives the path of a direct child after validating `name`.
	pub fn try_child(&self, name: &str) -> Result<Self, PathError> {
		validate_name(name)?;
		Ok(self.child(name))
	}

	/// Returns the parent path, or `None` for the root.
	pub fn parent(&self) -> Option<Self> {
		let (_, head) = self.segments.split_last()?;
		Some(Self {
			segments: Arc::from(head.to_vec()),
		})
	}

	/// Returns the last segment, or `None` for the root.
	pub fn name(&self) -> Option<&str> {
		self.segments.last().map(|s| &**s)
	}

	/// Iterates over the segments from the top down.
	pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
		self.segments.iter().map(|s| &**s)
	}

	/// Returns the number of segments.
	#[inline]
	pub fn depth(&self) -> usize {
		self.segments.len()
	}

	#[inline]
	pub fn is_root(&self) -> bool {
		self.segments.is_empty()
	}

	/// Returns true if `self` is a strict ancestor of `other`.
	pub fn is_ancestor_of(&self, other: &ModelPath) -> bool {
		self.depth() < other.depth() && other.segments[..self.depth()] == self.segments[..]
	}

	/// Returns true if `self` is exactly one level below `parent`.
	pub fn is_direct_child_of(&self, parent: &ModelPath) -> bool {
		self.depth() == parent.depth() + 1 && parent.is_ancestor_of(self)
	}

	/// Iterates over strict ancestors, nearest first, excluding the root.
	pub fn ancestors(&self) -> impl Iterator<Item = ModelPath> + '_ {
		(1..self.depth()).rev().map(move |len| Self {
			segments: Arc::from(self.segments[..len].to_vec()),
		})
	}
}

/// Validates one path segment.
pub fn validate_name(name: &str) -> Result<(), PathError> {
	let mut chars = name.chars();
	let Some(first) = chars.next() else {
		return Err(PathError::EmptySegment { path: name.to_string() });
	};
	if !(first.is_ascii_alphabetic() || first == '_') {
		return Err(PathError::IllegalFirstCharacter {
			segment: name.to_string(),
			ch: first,
		});
	}
	if let Some(ch) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-')) {
		return Err(PathError::IllegalCharacter {
			segment: name.to_string(),
			ch,
		});
	}
	Ok(())
}

impl fmt::Display for ModelPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_root() {
			return f.write_str("<root>");
		}
		for (i, segment) in self.segments.iter().enumerate() {
			if i > 0 {
				write!(f, "{SEPARATOR}")?;
			}
			f.write_str(segment)?;
		}
		Ok(())
	}
}

impl fmt::Debug for ModelPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ModelPath({self})")
	}
}

impl FromStr for ModelPath {
	type Err = PathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
