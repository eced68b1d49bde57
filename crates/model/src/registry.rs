//! The model registry facade.
//!
//! A [`ModelRegistry`] is scoped to one build invocation: construct it at
//! build start, register rules and seed collaborator facts, realize what the
//! build needs, report problems, and drop it. It is never a process-wide
//! singleton. Concurrent callers are safe; exclusion is per node, not global.

use cairn_problems::{ProblemId, ProblemSink, ProblemSummary};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::binder::RuleBinder;
use crate::config::RegistryConfig;
use crate::context::ExecutionContext;
use crate::descriptor::RuleDescriptor;
use crate::error::ModelError;
use crate::node::{NodeInfo, NodeTable};
use crate::path::ModelPath;
use crate::realize::{Demand, Realizer};
use crate::rule::ModelRule;
use crate::state::LifecycleState;
use crate::value::{FromValue, Value};


/// Owns the node table and rule binder and exposes registration and
/// realization to the rest of the build.
#[derive(Debug)]
pub struct ModelRegistry {
	nodes: NodeTable,
	binder: RuleBinder,
	config: RegistryConfig,
	problems: Mutex<FxHashMap<ProblemId, usize>>,
}

impl Default for ModelRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl ModelRegistry {
	/// Creates an empty registry with default configuration.
	pub fn new() -> Self {
		Self::with_config(RegistryConfig::default())
	}

	pub fn with_config(config: RegistryConfig) -> Self {
		Self {
			nodes: NodeTable::new(),
			binder: RuleBinder::new(),
			config,
			problems: Mutex::new(FxHashMap::default()),
		}
	}

	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	/// Registers a rule. Nothing executes until the subject is requested.
	pub fn register(&self, rule: ModelRule) -> Result<(), ModelError> {
		let result = self.binder.bind(&self.nodes, rule).map(|_| ());
		self.record(result)
	}

	/// Binds a pre-realized value at the terminal state.
	#[track_caller]
	pub fn seed(&self, path: &ModelPath, value: impl Into<Value>) -> Result<(), ModelError> {
		self.seed_with(path, value, RuleDescriptor::caller())
	}

	/// Binds a pre-realized value, attributing it to `descriptor`.
	pub fn seed_with(
		&self,
		path: &ModelPath,
		value: impl Into<Value>,
		descriptor: impl Into<RuleDescriptor>,
	) -> Result<(), ModelError> {
		let result = self
			.binder
			.seed(&self.nodes, path, value.into(), descriptor.into())
			.map(|_| ());
		self.record(result)
	}

	/// Brings `path` to `state`, executing every rule needed on the way, and
	/// returns the node's value.
	pub fn get(&self, path: &ModelPath, state: LifecycleState) -> Result<Value, ModelError> {
		let mut ctx = ExecutionContext::new();
		self.get_in(&mut ctx, path, state)
	}

	/// Like [`ModelRegistry::get`], on a caller-owned execution context.
	///
	/// The context's stack is balanced again when this returns.
	pub fn get_in(&self, ctx: &mut ExecutionContext, path: &ModelPath, state: LifecycleState) -> Result<Value, ModelError> {
		let result = self.ensure_known(path).and_then(|()| {
			tracing::debug!(path = %path, state = %state, "model.get");
			self.realizer().realize(ctx, path, state, Demand::Request)
		});
		self.record(result)
	}

	/// Realizes and converts the value at `path`.
	///
	/// Returns `Ok(None)` if the value has a different type.
	pub fn get_as<T: FromValue>(&self, path: &ModelPath, state: LifecycleState) -> Result<Option<T>, ModelError> {
		self.get(path, state).map(|value| T::from_value(&value))
	}

	/// Closes `path` and every addressable descendant.
	pub fn close_graph(&self, path: &ModelPath) -> Result<(), ModelError> {
		let mut ctx = ExecutionContext::new();
		let result = self.ensure_known(path).and_then(|()| self.close_subtree(&mut ctx, path));
		self.record(result)
	}

	fn close_subtree(&self, ctx: &mut ExecutionContext, path: &ModelPath) -> Result<(), ModelError> {
		let realizer = self.realizer();
		let mut pending = vec![path.clone()];
		while let Some(next) = pending.pop() {
			realizer.realize(ctx, &next, LifecycleState::Closed, Demand::Request)?;
			let Some(cell) = self.nodes.get(&next) else {
				continue;
			};
			let children: Vec<ModelPath> = cell.data.read().children.iter().rev().cloned().collect();
			for child in children {
				let addressable = self
					.nodes
					.get(&child)
					.is_some_and(|cell| cell.data.read().is_addressable());
				if addressable {
					pending.push(child);
				}
			}
		}
		tracing::debug!(path = %path, "model.close-graph");
		Ok(())
	}

	/// Current state of `path`, if the node exists.
	pub fn state(&self, path: &ModelPath) -> Option<LifecycleState> {
		self.nodes.get(path).map(|cell| cell.state())
	}

	/// Returns true if a node exists at `path`, placeholder or not.
	pub fn contains(&self, path: &ModelPath) -> bool {
		self.nodes.get(path).is_some()
	}

	/// Direct children of `path`, sorted.
	pub fn children(&self, path: &ModelPath) -> Vec<ModelPath> {
		self.nodes
			.get(path)
			.map(|cell| cell.data.read().children.iter().cloned().collect())
			.unwrap_or_default()
	}

	/// Describes the node at `path`.
	pub fn node_info(&self, path: &ModelPath) -> Option<NodeInfo> {
		self.nodes.get(path).map(|cell| cell.data.read().info())
	}

	/// All node paths, sorted.
	pub fn paths(&self) -> Vec<ModelPath> {
		self.nodes.paths()
	}

	/// Number of registered rules.
	pub fn rule_count(&self) -> usize {
		self.binder.len()
	}

	/// Descriptors of registered rules in registration order.
	pub fn rule_descriptors(&self) -> Vec<RuleDescriptor> {
		self.binder
			.rules()
			.iter()
			.map(|rule| rule.descriptor().clone())
			.collect()
	}

	/// Number of nodes, placeholders included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Failure counts per problem identifier, sorted by identifier.
	pub fn problem_summaries(&self) -> Vec<ProblemSummary> {
		let guard = self.problems.lock();
		let mut summaries: Vec<_> = guard
			.iter()
			.map(|(id, count)| ProblemSummary::new(id.clone(), *count))
			.collect();
		summaries.sort_by(|a, b| a.id.cmp(&b.id));
		summaries
	}

	/// Emits the failure summary to `sink`. Does nothing if nothing failed.
	pub fn report_problems(&self, sink: &dyn ProblemSink) {
		let summaries = self.problem_summaries();
		if summaries.is_empty() {
			return;
		}
		tracing::debug!(kinds = summaries.len(), "model.report-problems");
		sink.report(&summaries);
	}

	fn ensure_known(&self, path: &ModelPath) -> Result<(), ModelError> {
		let known = self
			.nodes
			.get(path)
			.is_some_and(|cell| cell.data.read().is_addressable());
		if known {
			Ok(())
		} else {
			Err(ModelError::UnknownPath { path: path.clone() })
		}
	}

	fn realizer(&self) -> Realizer<'_> {
		Realizer::new(&self.nodes, self.config.max_depth)
	}

	fn record<T>(&self, result: Result<T, ModelError>) -> Result<T, ModelError> {
		if let Err(error) = &result
			&& self.config.record_problems
		{
			*self.problems.lock().entry(error.problem_id()).or_default() += 1;
		}
		result
	}
}
