//! Dependency-ordered realization of model nodes.
//!
//! Realizing `(path, target)` walks the node's states one at a time from its
//! current state up to `target`. For each step with a bound rule, the rule's
//! inputs are realized first (recursively), then the action runs under the
//! node's transition lock and the state advances. Steps without a rule are
//! plain state advances.
//!
//! # Invariants
//!
//! - A transition's rule runs at most once, whatever the number of callers
//!   or threads. Later callers observe the advanced state, or replay the
//!   recorded failure if the rule failed.
//! - Inputs reach their required state strictly before the dependent action
//!   runs.
//! - Re-entering a transition already in flight on the same context fails
//!   with [`ModelError::CyclicRuleDependency`] instead of blocking.
//! - No node lock is held while inputs are realized, so the locking
//!   discipline itself cannot produce cross-node lock cycles.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::error::{ModelError, RuleFailure};
use crate::node::{NodeCell, NodeTable};
use crate::path::ModelPath;
use crate::rule::ModelRule;
use crate::scope::RuleScope;
use crate::state::LifecycleState;
use crate::value::{Value, ValueType};

/// Why a node is being realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Demand {
	/// Requested directly by a caller of the registry.
	Request,
	/// Required as a declared input of another rule.
	Input,
}

/// One step of realization.
struct Step<'n> {
	cell: &'n NodeCell,
	path: &'n ModelPath,
	state: LifecycleState,
	target: LifecycleState,
	demand: Demand,
}

pub(crate) struct Realizer<'a> {
	nodes: &'a NodeTable,
	max_depth: usize,
}

impl<'a> Realizer<'a> {
	pub(crate) fn new(nodes: &'a NodeTable, max_depth: usize) -> Self {
		Self { nodes, max_depth }
	}

	/// Brings `path` to at least `target` and returns its value.
	pub(crate) fn realize(
		&self,
		ctx: &mut ExecutionContext,
		path: &ModelPath,
		target: LifecycleState,
		demand: Demand,
	) -> Result<Value, ModelError> {
		let cell = match demand {
			Demand::Request => self
				.nodes
				.get(path)
				.ok_or_else(|| ModelError::UnknownPath { path: path.clone() })?,
			Demand::Input => self.nodes.node(path),
		};

		loop {
			let state = {
				let node = cell.data.read();
				if node.state >= target {
					tracing::trace!(path = %path, state = %node.state, target = %target, "model.realize.satisfied");
					return Ok(node.value.clone().unwrap_or(Value::Unit));
				}
				if let Some((failed, error)) = &node.failure
					&& *failed <= target
				{
					return Err(error.clone());
				}
				match node.state.next() {
					Some(next) => next,
					None => return Ok(node.value.clone().unwrap_or(Value::Unit)),
				}
			};

			self.advance(
				ctx,
				Step {
					cell: &cell,
					path,
					state,
					target,
					demand,
				},
			)?;
		}
	}

	fn advance(&self, ctx: &mut ExecutionContext, step: Step<'_>) -> Result<(), ModelError> {
		let rule = step.cell.data.read().rules.get(&step.state).cloned();
		match rule {
			Some(rule) => self.advance_with_rule(ctx, step, &rule),
			None => self.advance_without_rule(ctx, step),
		}
	}

	fn advance_with_rule(
		&self,
		ctx: &mut ExecutionContext,
		step: Step<'_>,
		rule: &Arc<ModelRule>,
	) -> Result<(), ModelError> {
		if !ctx.enter(step.path, step.state) {
			let chain = ctx.chain();
			tracing::warn!(path = %step.path, state = %step.state, chain = %chain, "model.realize.cycle");
			return Err(ModelError::CyclicRuleDependency {
				path: step.path.clone(),
				state: step.state,
				chain,
			});
		}
		if ctx.depth() >= self.max_depth {
			ctx.leave(step.path, step.state);
			return Err(ModelError::RealizationTooDeep {
				path: step.path.clone(),
				max_depth: self.max_depth,
				chain: ctx.chain(),
			});
		}

		let (path, state) = (step.path, step.state);
		let result = ctx.run(rule.descriptor().clone(), |ctx| self.execute(ctx, step, rule));
		ctx.leave(path, state);
		result
	}

	fn execute(&self, ctx: &mut ExecutionContext, step: Step<'_>, rule: &ModelRule) -> Result<(), ModelError> {
		let mut inputs = Vec::with_capacity(rule.declared_inputs().len());
		for input in rule.declared_inputs() {
			let value = self.realize(ctx, &input.path, input.state, Demand::Input)?;
			inputs.push((input.clone(), value));
		}

		let _transition = step.cell.transition.lock();
		let current = {
			let node = step.cell.data.read();
			if node.state >= step.state {
				tracing::trace!(path = %step.path, state = %step.state, "model.realize.already-advanced");
				return Ok(());
			}
			if let Some((failed, error)) = &node.failure
				&& *failed <= step.state
			{
				return Err(error.clone());
			}
			node.value.clone()
		};

		tracing::debug!(path = %step.path, state = %step.state, rule = %rule.descriptor(), "model.rule.execute");
		let (outcome, produced) = {
			let mut scope = RuleScope::new(rule.subject(), ctx, &inputs, current);
			let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.invoke(&mut scope)));
			(outcome, scope.into_value())
		};

		let mut node = step.cell.data.write();
		let failure = match outcome {
			Ok(Ok(())) => check_output(step.path, node.value_type, produced.as_ref()).err(),
			Ok(Err(error)) => Some(RuleFailure::new(error)),
			Err(payload) => Some(RuleFailure::from_panic(payload)),
		};

		match failure {
			None => {
				if node.value_type.is_none() {
					node.value_type = produced.as_ref().map(Value::value_type);
				}
				node.value = produced;
				node.state = step.state;
				tracing::debug!(path = %step.path, state = %step.state, rule = %rule.descriptor(), "model.rule.complete");
				Ok(())
			}
			Some(source) => {
				let error = ModelError::RuleExecutionFailure {
					path: step.path.clone(),
					state: step.state,
					chain: ctx.chain(),
					source,
				};
				tracing::warn!(path = %step.path, state = %step.state, error = %error, "model.rule.failed");
				node.failure = Some((step.state, error.clone()));
				Err(error)
			}
		}
	}

	fn advance_without_rule(&self, ctx: &mut ExecutionContext, step: Step<'_>) -> Result<(), ModelError> {
		let _transition = step.cell.transition.lock();
		let mut node = step.cell.data.write();
		if node.state >= step.state || node.rules.contains_key(&step.state) {
			// Advanced elsewhere, or a rule was bound since we looked. The
			// caller's loop re-reads the node either way.
			return Ok(());
		}

		// Only an unregistered leaf reached as an input is unbound. Anything
		// else advances without a value and reads as `Unit` until a rule
		// produces one.
		let unbound = step.state == LifecycleState::Created
			&& node.value.is_none()
			&& !node.registered
			&& step.demand == Demand::Input
			&& node.children.is_empty();
		if unbound {
			let chain = ctx.chain();
			tracing::warn!(path = %step.path, state = %step.target, chain = %chain, "model.realize.unbound");
			return Err(ModelError::UnboundRuleInput {
				path: step.path.clone(),
				state: step.target,
				chain,
			});
		}

		node.state = step.state;
		tracing::trace!(path = %step.path, state = %step.state, "model.realize.advance");
		Ok(())
	}
}

fn check_output(path: &ModelPath, declared: Option<ValueType>, produced: Option<&Value>) -> Result<(), RuleFailure> {
	let Some(value) = produced else {
		return Err(RuleFailure::new(anyhow::anyhow!("rule did not produce a value for {path}")));
	};
	match declared {
		Some(ty) if !value.matches_type(ty) => Err(RuleFailure::new(anyhow::anyhow!(
			"rule produced a {} value but {path} holds {ty}",
			value.value_type()
		))),
		_ => Ok(()),
	}
}
