use pretty_assertions::assert_eq;

use super::{ProblemCollector, ProblemId, ProblemSink, ProblemSummary};

fn id(name: &str) -> ProblemId {
	ProblemId::new("model", name, name)
}

#[test]
fn collector_accumulates_across_batches() {
	let collector = ProblemCollector::new();
	collector.report(&[ProblemSummary::new(id("a"), 2), ProblemSummary::new(id("b"), 1)]);
	collector.report(&[ProblemSummary::new(id("a"), 3)]);

	assert_eq!(collector.count(&id("a")), 5);
	assert_eq!(collector.count(&id("b")), 1);
	assert_eq!(collector.count(&id("missing")), 0);
	assert_eq!(collector.total(), 6);
}

#[test]
fn zero_counts_are_ignored() {
	let collector = ProblemCollector::new();
	collector.report(&[ProblemSummary::new(id("a"), 0)]);
	assert!(collector.summaries().is_empty());
}

#[test]
fn summaries_are_sorted_and_drain_clears() {
	let collector = ProblemCollector::new();
	collector.report(&[ProblemSummary::new(id("z"), 1), ProblemSummary::new(id("a"), 1)]);

	let names: Vec<_> = collector.summaries().into_iter().map(|s| s.id.name).collect();
	assert_eq!(names, vec!["a".to_string(), "z".to_string()]);

	assert_eq!(collector.drain().len(), 2);
	assert_eq!(collector.total(), 0);
}

#[test]
fn display_joins_group_and_name() {
	assert_eq!(ProblemId::new("model", "unknown-path", "Unknown path").to_string(), "model:unknown-path");
}
