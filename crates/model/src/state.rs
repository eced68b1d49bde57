//! Lifecycle states of a model node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordered stage a node's value passes through.
///
/// States only ever advance for a given node. A node at [`LifecycleState::Closed`]
/// is immutable and accepts no further rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleState {
	/// The path is referenced but nothing has been produced yet.
	Known,
	/// The node's value exists.
	Created,
	/// Defaults have been applied to the value.
	DefaultsApplied,
	/// The value has been initialized.
	Initialized,
	/// General mutation has been applied.
	Mutated,
	/// Final adjustments have been applied.
	Finalized,
	/// The value is immutable.
	Closed,
}

impl LifecycleState {
	/// All states in ascending order.
	pub const ALL: [LifecycleState; 7] = [
		LifecycleState::Known,
		LifecycleState::Created,
		LifecycleState::DefaultsApplied,
		LifecycleState::Initialized,
		LifecycleState::Mutated,
		LifecycleState::Finalized,
		LifecycleState::Closed,
	];

	/// The terminal state.
	pub const TERMINAL: LifecycleState = LifecycleState::Closed;

	/// Returns the state immediately after this one, or `None` at the terminal state.
	pub fn next(self) -> Option<LifecycleState> {
		Self::ALL.get(self.ordinal() + 1).copied()
	}

	/// Returns the states strictly after `self` up to and including `target`.
	pub fn steps_to(self, target: LifecycleState) -> impl Iterator<Item = LifecycleState> {
		Self::ALL
			.into_iter()
			.filter(move |s| *s > self && *s <= target)
	}

	/// Position within [`LifecycleState::ALL`].
	#[inline]
	pub const fn ordinal(self) -> usize {
		self as usize
	}

	/// Kebab-case name.
	pub const fn as_str(self) -> &'static str {
		match self {
			LifecycleState::Known => "known",
			LifecycleState::Created => "created",
			LifecycleState::DefaultsApplied => "defaults-applied",
			LifecycleState::Initialized => "initialized",
			LifecycleState::Mutated => "mutated",
			LifecycleState::Finalized => "finalized",
			LifecycleState::Closed => "closed",
		}
	}
}

impl fmt::Display for LifecycleState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Unrecognized lifecycle state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown lifecycle state {0:?}")]
pub struct UnknownState(pub String);

impl FromStr for LifecycleState {
	type Err = UnknownState;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|state| state.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownState(s.to_string()))
	}
}
