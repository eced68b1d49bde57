//! Per-request record of the rules currently executing.
//!
//! The context is an explicit object owned by whoever drives a realization
//! (normally one per top-level [`crate::ModelRegistry::get`] call), never
//! ambient global state. Each thread therefore only ever sees the rules it
//! is itself executing.
//!
//! # Invariants
//!
//! - Every push is matched by exactly one pop, including when the body
//!   fails or panics, so [`ExecutionContext::depth`] always equals the
//!   number of active [`ExecutionContext::run`] scopes.
//! - A (path, state) transition is in flight at most once per context.
//!   Re-entering one is a cyclic rule dependency.

use std::panic::{self, AssertUnwindSafe};

use rustc_hash::FxHashSet;

use crate::descriptor::{RuleChain, RuleDescriptor};
use crate::path::ModelPath;
use crate::state::LifecycleState;


/// Stack of active rule descriptors plus the transitions in flight.
#[derive(Debug, Default)]
pub struct ExecutionContext {
	stack: Vec<RuleDescriptor>,
	in_flight: FxHashSet<(ModelPath, LifecycleState)>,
}

impl ExecutionContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pushes a descriptor. Prefer [`ExecutionContext::run`], which cannot
	/// leave the stack unbalanced.
	pub fn push(&mut self, descriptor: RuleDescriptor) {
		tracing::trace!(rule = %descriptor, depth = self.stack.len() + 1, "model.context.push");
		self.stack.push(descriptor);
	}

	/// Pops the innermost descriptor.
	pub fn pop(&mut self) -> Option<RuleDescriptor> {
		let popped = self.stack.pop();
		if let Some(descriptor) = &popped {
			tracing::trace!(rule = %descriptor, depth = self.stack.len(), "model.context.pop");
		}
		popped
	}

	/// Innermost active descriptor.
	pub fn current(&self) -> Option<&RuleDescriptor> {
		self.stack.last()
	}

	/// Number of active rule executions.
	pub fn depth(&self) -> usize {
		self.stack.len()
	}

	/// Active descriptors, innermost first.
	pub fn chain(&self) -> RuleChain {
		RuleChain::new(self.stack.iter().rev().cloned().collect())
	}

	/// Runs `body` with `descriptor` pushed, popping it on every exit path.
	///
	/// A panic in `body` is resumed after the pop.
	pub fn run<R>(&mut self, descriptor: RuleDescriptor, body: impl FnOnce(&mut Self) -> R) -> R {
		self.push(descriptor);
		let depth = self.stack.len();
		let result = panic::catch_unwind(AssertUnwindSafe(|| body(&mut *self)));
		// A body that pushed without popping must not leak frames past its scope.
		self.stack.truncate(depth);
		self.pop();
		match result {
			Ok(value) => value,
			Err(payload) => panic::resume_unwind(payload),
		}
	}

	/// Returns true if the transition is in progress on this context.
	pub fn is_in_flight(&self, path: &ModelPath, state: LifecycleState) -> bool {
		self.in_flight.contains(&(path.clone(), state))
	}

	/// Marks a transition in flight. Returns false if it already was.
	pub(crate) fn enter(&mut self, path: &ModelPath, state: LifecycleState) -> bool {
		self.in_flight.insert((path.clone(), state))
	}

	pub(crate) fn leave(&mut self, path: &ModelPath, state: LifecycleState) {
		self.in_flight.remove(&(path.clone(), state));
	}

	/// Number of transitions in progress.
	pub fn in_flight_len(&self) -> usize {
		self.in_flight.len()
	}
}
