//! What a running rule action can see.

use std::any::Any;

use crate::context::ExecutionContext;
use crate::descriptor::{RuleChain, RuleDescriptor};
use crate::path::ModelPath;
use crate::rule::ModelReference;
use crate::state::LifecycleState;
use crate::value::{FromValue, Value};

/// Input access failures raised inside rule actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
	#[error("input index {index} out of range ({declared} inputs declared)")]
	OutOfRange { index: usize, declared: usize },
	#[error("{path} is not a declared input of this rule")]
	NotDeclared { path: ModelPath },
	#[error("input {path} has type {actual}, expected {expected}")]
	TypeMismatch {
		path: ModelPath,
		expected: String,
		actual: String,
	},
}

/// Handle passed to a rule action.
///
/// Gives read access to the rule's realized inputs, read/write access to the
/// subject's value, and the descriptors of the rules currently executing.
pub struct RuleScope<'a> {
	subject: &'a ModelReference,
	context: &'a ExecutionContext,
	inputs: &'a [(ModelReference, Value)],
	value: Option<Value>,
}

impl<'a> RuleScope<'a> {
	pub(crate) fn new(
		subject: &'a ModelReference,
		context: &'a ExecutionContext,
		inputs: &'a [(ModelReference, Value)],
		value: Option<Value>,
	) -> Self {
		Self {
			subject,
			context,
			inputs,
			value,
		}
	}

	/// Path of the node this rule advances.
	pub fn subject(&self) -> &ModelPath {
		&self.subject.path
	}

	/// State the subject reaches once this rule completes.
	pub fn target_state(&self) -> LifecycleState {
		self.subject.state
	}

	/// The rule currently running.
	pub fn current_rule(&self) -> Option<&RuleDescriptor> {
		self.context.current()
	}

	/// All active rules, innermost first.
	pub fn rule_chain(&self) -> RuleChain {
		self.context.chain()
	}

	/// Number of declared inputs.
	pub fn input_count(&self) -> usize {
		self.inputs.len()
	}

	/// Value of the input declared at `index`.
	pub fn input(&self, index: usize) -> Result<&Value, InputError> {
		self.inputs
			.get(index)
			.map(|(_, value)| value)
			.ok_or(InputError::OutOfRange {
				index,
				declared: self.inputs.len(),
			})
	}

	/// Value of the declared input at `path`.
	pub fn input_at(&self, path: &ModelPath) -> Result<&Value, InputError> {
		self.inputs
			.iter()
			.find(|(reference, _)| &reference.path == path)
			.map(|(_, value)| value)
			.ok_or_else(|| InputError::NotDeclared { path: path.clone() })
	}

	/// Converts the input declared at `index`.
	pub fn input_as<T: FromValue>(&self, index: usize) -> Result<T, InputError> {
		let value = self.input(index)?;
		T::from_value(value).ok_or_else(|| InputError::TypeMismatch {
			path: self.inputs[index].0.path.clone(),
			expected: T::expected().to_string(),
			actual: value.value_type().to_string(),
		})
	}

	/// Borrows the object input declared at `index`.
	pub fn input_object<T: Any + Send + Sync>(&self, index: usize) -> Result<&T, InputError> {
		let value = self.input(index)?;
		value.downcast_ref::<T>().ok_or_else(|| InputError::TypeMismatch {
			path: self.inputs[index].0.path.clone(),
			expected: std::any::type_name::<T>().to_string(),
			actual: value.value_type().to_string(),
		})
	}

	/// Subject's current value.
	pub fn value(&self) -> Option<&Value> {
		self.value.as_ref()
	}

	/// Mutable access to the subject's current value.
	pub fn value_mut(&mut self) -> Option<&mut Value> {
		self.value.as_mut()
	}

	/// Replaces the subject's value.
	pub fn set_value(&mut self, value: impl Into<Value>) {
		self.value = Some(value.into());
	}

	pub(crate) fn into_value(self) -> Option<Value> {
		self.value
	}
}
