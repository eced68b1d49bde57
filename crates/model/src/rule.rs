//! Rule declarations.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::RuleDescriptor;
use crate::path::ModelPath;
use crate::scope::RuleScope;
use crate::state::LifecycleState;
use crate::value::{Value, ValueType};

/// A (path, state) pair: a rule's subject or one of its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelReference {
	pub path: ModelPath,
	pub state: LifecycleState,
}

impl ModelReference {
	pub fn new(path: ModelPath, state: LifecycleState) -> Self {
		Self { path, state }
	}
}

impl fmt::Display for ModelReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}", self.path, self.state)
	}
}

/// Body of a rule.
pub type RuleAction = Arc<dyn Fn(&mut RuleScope<'_>) -> anyhow::Result<()> + Send + Sync>;

/// A declarative configuration rule.
///
/// A rule advances its subject node to the subject state. Its inputs are
/// realized to their required states before the action runs. Rules are
/// registered once and executed at most once.
#[derive(Clone)]
pub struct ModelRule {
	subject: ModelReference,
	inputs: Vec<ModelReference>,
	descriptor: RuleDescriptor,
	output: Option<ValueType>,
	action: RuleAction,
}

impl ModelRule {
	/// Creates a rule advancing `path` to `state`.
	pub fn new<F>(path: ModelPath, state: LifecycleState, descriptor: impl Into<RuleDescriptor>, action: F) -> Self
	where
		F: Fn(&mut RuleScope<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
	{
		Self {
			subject: ModelReference::new(path, state),
			inputs: Vec::new(),
			descriptor: descriptor.into(),
			output: None,
			action: Arc::new(action),
		}
	}

	/// Creates a rule that produces the node's value at [`LifecycleState::Created`].
	pub fn creator<F, V>(path: ModelPath, descriptor: impl Into<RuleDescriptor>, create: F) -> Self
	where
		F: Fn(&RuleScope<'_>) -> anyhow::Result<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		Self::new(path, LifecycleState::Created, descriptor, move |scope| {
			let value = create(scope)?.into();
			scope.set_value(value);
			Ok(())
		})
	}

	/// Appends a declared input.
	pub fn input(mut self, path: ModelPath, state: LifecycleState) -> Self {
		self.inputs.push(ModelReference::new(path, state));
		self
	}

	/// Appends several declared inputs.
	pub fn inputs<I>(mut self, inputs: I) -> Self
	where
		I: IntoIterator<Item = ModelReference>,
	{
		self.inputs.extend(inputs);
		self
	}

	/// Declares the type of value this rule leaves on its subject.
	pub fn output(mut self, ty: ValueType) -> Self {
		self.output = Some(ty);
		self
	}

	pub fn subject(&self) -> &ModelReference {
		&self.subject
	}

	pub fn declared_inputs(&self) -> &[ModelReference] {
		&self.inputs
	}

	pub fn descriptor(&self) -> &RuleDescriptor {
		&self.descriptor
	}

	pub fn output_type(&self) -> Option<ValueType> {
		self.output
	}

	pub(crate) fn invoke(&self, scope: &mut RuleScope<'_>) -> anyhow::Result<()> {
		(self.action)(scope)
	}
}

impl fmt::Debug for ModelRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelRule")
			.field("subject", &self.subject)
			.field("inputs", &self.inputs)
			.field("descriptor", &self.descriptor)
			.field("output", &self.output)
			.finish_non_exhaustive()
	}
}
