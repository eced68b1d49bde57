//! Rule registration and validation.
//!
//! # Invariants
//!
//! - At most one rule per (path, state). A second rule for the same subject
//!   is rejected with [`ModelError::DuplicateBinding`] and the first stays
//!   in effect.
//! - A rule may only target a state strictly after its subject's current
//!   state. Nothing can bind to a [`LifecycleState::Closed`] node.
//! - Registration never executes anything.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::descriptor::RuleDescriptor;
use crate::error::ModelError;
use crate::node::{NodeCell, NodeTable};
use crate::path::ModelPath;
use crate::rule::ModelRule;
use crate::state::LifecycleState;
use crate::value::Value;


/// Owner of every registered rule.
#[derive(Debug, Default)]
pub(crate) struct RuleBinder {
	rules: Mutex<Vec<Arc<ModelRule>>>,
}

impl RuleBinder {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Validates `rule` and binds it to its subject's per-state slot.
	///
	/// Subject and input nodes are created as placeholders if needed.
	pub(crate) fn bind(&self, nodes: &NodeTable, rule: ModelRule) -> Result<Arc<ModelRule>, ModelError> {
		let subject = rule.subject().clone();
		let cell = nodes.node(&subject.path);
		for input in rule.declared_inputs() {
			nodes.node(&input.path);
		}

		let rule = Arc::new(rule);
		{
			let _transition = cell.transition.lock();
			let mut node = cell.data.write();

			if let Some(existing) = node.rules.get(&subject.state) {
				return Err(ModelError::DuplicateBinding {
					path: subject.path,
					state: subject.state,
					existing: existing.descriptor().clone(),
					incoming: rule.descriptor().clone(),
				});
			}

			if subject.state == LifecycleState::Known || node.state >= subject.state {
				return Err(ModelError::InvalidStateTransition {
					path: subject.path,
					current: node.state,
					target: subject.state,
					rule: rule.descriptor().clone(),
				});
			}

			if let Some(declared) = rule.output_type() {
				match node.value_type {
					Some(existing) if existing != declared => {
						return Err(ModelError::TypeMismatch {
							path: subject.path,
							existing,
							declared,
							rule: rule.descriptor().clone(),
						});
					}
					_ => node.value_type = Some(declared),
				}
			}

			node.rules.insert(subject.state, rule.clone());
			node.registered = true;
		}

		tracing::debug!(
			path = %subject.path,
			state = %subject.state,
			rule = %rule.descriptor(),
			inputs = rule.declared_inputs().len(),
			"model.rule.bind",
		);
		self.rules.lock().push(rule.clone());
		Ok(rule)
	}

	/// Binds a pre-realized value at the terminal state.
	pub(crate) fn seed(
		&self,
		nodes: &NodeTable,
		path: &ModelPath,
		value: Value,
		descriptor: RuleDescriptor,
	) -> Result<Arc<NodeCell>, ModelError> {
		let cell = nodes.node(path);
		{
			let _transition = cell.transition.lock();
			let mut node = cell.data.write();

			let existing = node
				.seeded_by
				.clone()
				.or_else(|| node.rules.values().next().map(|rule| rule.descriptor().clone()));
			if let Some(existing) = existing {
				return Err(ModelError::DuplicateBinding {
					path: path.clone(),
					state: LifecycleState::TERMINAL,
					existing,
					incoming: descriptor,
				});
			}
			if node.state != LifecycleState::Known {
				return Err(ModelError::InvalidStateTransition {
					path: path.clone(),
					current: node.state,
					target: LifecycleState::TERMINAL,
					rule: descriptor,
				});
			}

			node.value_type = Some(value.value_type());
			node.value = Some(value);
			node.state = LifecycleState::TERMINAL;
			node.registered = true;
			node.seeded_by = Some(descriptor.clone());
		}
		tracing::debug!(path = %path, rule = %descriptor, "model.node.seed");
		Ok(cell)
	}

	/// Number of registered rules.
	pub(crate) fn len(&self) -> usize {
		self.rules.lock().len()
	}

	/// Registered rules in registration order.
	pub(crate) fn rules(&self) -> Vec<Arc<ModelRule>> {
		self.rules.lock().clone()
	}
}
