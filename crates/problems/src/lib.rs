//! Problem identifiers and aggregated failure summaries.
//!
//! The model core does not format or persist failures. It only emits
//! `(identifier, count)` pairs to a [`ProblemSink`] at the end of a build.

use std::fmt;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// Stable identifier of a category of problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProblemId {
	/// Group the problem belongs to (e.g. `model`).
	pub group: String,
	/// Machine-readable name, unique within the group.
	pub name: String,
	/// Human-readable label.
	pub display_name: String,
}

impl ProblemId {
	/// Creates a new problem identifier.
	pub fn new(group: impl Into<String>, name: impl Into<String>, display_name: impl Into<String>) -> Self {
		Self {
			group: group.into(),
			name: name.into(),
			display_name: display_name.into(),
		}
	}
}

impl fmt::Display for ProblemId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.group, self.name)
	}
}

/// Number of occurrences of one problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSummary {
	pub id: ProblemId,
	pub count: usize,
}

impl ProblemSummary {
	pub fn new(id: ProblemId, count: usize) -> Self {
		Self { id, count }
	}
}

/// Receiver of aggregated problem summaries.
pub trait ProblemSink: Send + Sync {
	/// Accepts one batch of summaries. Identifiers may repeat across batches.
	fn report(&self, summaries: &[ProblemSummary]);
}

/// In-memory sink accumulating counts across batches.
#[derive(Debug, Default)]
pub struct ProblemCollector {
	counts: Mutex<FxHashMap<ProblemId, usize>>,
}

impl ProblemCollector {
	/// Creates an empty collector.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the accumulated count for `id`, or zero.
	pub fn count(&self, id: &ProblemId) -> usize {
		self.counts.lock().get(id).copied().unwrap_or(0)
	}

	/// Returns the sum of all counts.
	pub fn total(&self) -> usize {
		self.counts.lock().values().sum()
	}

	/// Returns summaries sorted by identifier.
	pub fn summaries(&self) -> Vec<ProblemSummary> {
		let guard = self.counts.lock();
		let mut out: Vec<_> = guard
			.iter()
			.map(|(id, count)| ProblemSummary::new(id.clone(), *count))
			.collect();
		out.sort_by(|a, b| a.id.cmp(&b.id));
		out
	}

	/// Removes and returns everything collected so far.
	pub fn drain(&self) -> Vec<ProblemSummary> {
		let summaries = self.summaries();
		self.counts.lock().clear();
		summaries
	}
}

impl ProblemSink for ProblemCollector {
	fn report(&self, summaries: &[ProblemSummary]) {
		let mut guard = self.counts.lock();
		for summary in summaries {
			if summary.count == 0 {
				continue;
			}
			tracing::trace!(problem = %summary.id, count = summary.count, "problems.report");
			*guard.entry(summary.id.clone()).or_default() += summary.count;
		}
	}
}
