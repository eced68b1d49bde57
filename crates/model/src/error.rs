use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cairn_problems::ProblemId;

use crate::descriptor::{RuleChain, RuleDescriptor};
use crate::path::{ModelPath, PathError};
use crate::state::LifecycleState;
use crate::value::ValueType;

/// Errors surfaced by registration and realization.
///
/// Every realization error carries the chain of rule descriptors that was
/// active when it occurred, innermost first.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
	/// Two rules target the same (path, state).
	#[error("duplicate binding for {path} at {state}: {existing} is already bound, rejected {incoming}")]
	DuplicateBinding {
		path: ModelPath,
		state: LifecycleState,
		existing: RuleDescriptor,
		incoming: RuleDescriptor,
	},
	/// A rule targets a state its subject can no longer reach.
	#[error("invalid state transition for {path}: {rule} targets {target} but the node is already {current}")]
	InvalidStateTransition {
		path: ModelPath,
		current: LifecycleState,
		target: LifecycleState,
		rule: RuleDescriptor,
	},
	/// A rule declares an output type that conflicts with the node's declared type.
	#[error("type mismatch for {path}: {rule} declares {declared} but the node holds {existing}")]
	TypeMismatch {
		path: ModelPath,
		existing: ValueType,
		declared: ValueType,
		rule: RuleDescriptor,
	},
	/// A declared input has no rule or seeded value able to produce it.
	#[error("no rule produces input {path} at {state} (rule chain: {chain})")]
	UnboundRuleInput {
		path: ModelPath,
		state: LifecycleState,
		chain: RuleChain,
	},
	/// Input realization re-entered a transition already in progress.
	#[error("cyclic rule dependency on {path} at {state} (rule chain: {chain})")]
	CyclicRuleDependency {
		path: ModelPath,
		state: LifecycleState,
		chain: RuleChain,
	},
	/// A rule action failed.
	#[error("rule failed while realizing {path} to {state} (rule chain: {chain}): {source}")]
	RuleExecutionFailure {
		path: ModelPath,
		state: LifecycleState,
		chain: RuleChain,
		source: RuleFailure,
	},
	/// The path was never registered and has no children.
	#[error("unknown model path {path}")]
	UnknownPath { path: ModelPath },
	/// Nested realization exceeded the configured depth limit.
	#[error("realizing {path} exceeded the maximum nesting depth of {max_depth} (rule chain: {chain})")]
	RealizationTooDeep {
		path: ModelPath,
		max_depth: usize,
		chain: RuleChain,
	},
	#[error(transparent)]
	Path(#[from] PathError),
}

impl ModelError {
	/// Descriptor chain active at the failure point, if the error has one.
	pub fn chain(&self) -> Option<&RuleChain> {
		match self {
			ModelError::UnboundRuleInput { chain, .. }
			| ModelError::CyclicRuleDependency { chain, .. }
			| ModelError::RuleExecutionFailure { chain, .. }
			| ModelError::RealizationTooDeep { chain, .. } => Some(chain),
			_ => None,
		}
	}

	/// Stable kebab-case name of the error kind.
	pub fn kind_name(&self) -> &'static str {
		match self {
			ModelError::DuplicateBinding { .. } => "duplicate-binding",
			ModelError::InvalidStateTransition { .. } => "invalid-state-transition",
			ModelError::TypeMismatch { .. } => "type-mismatch",
			ModelError::UnboundRuleInput { .. } => "unbound-rule-input",
			ModelError::CyclicRuleDependency { .. } => "cyclic-rule-dependency",
			ModelError::RuleExecutionFailure { .. } => "rule-execution-failure",
			ModelError::UnknownPath { .. } => "unknown-path",
			ModelError::RealizationTooDeep { .. } => "realization-too-deep",
			ModelError::Path(_) => "invalid-path",
		}
	}

	/// Problem identifier this error is counted under.
	pub fn problem_id(&self) -> ProblemId {
		let display = match self {
			ModelError::DuplicateBinding { .. } => "Duplicate rule binding",
			ModelError::InvalidStateTransition { .. } => "Invalid state transition",
			ModelError::TypeMismatch { .. } => "Model type mismatch",
			ModelError::UnboundRuleInput { .. } => "Unbound rule input",
			ModelError::CyclicRuleDependency { .. } => "Cyclic rule dependency",
			ModelError::RuleExecutionFailure { .. } => "Rule execution failure",
			ModelError::UnknownPath { .. } => "Unknown model path",
			ModelError::RealizationTooDeep { .. } => "Realization too deep",
			ModelError::Path(_) => "Invalid model path",
		};
		ProblemId::new(PROBLEM_GROUP, self.kind_name(), display)
	}
}

/// Problem group for model errors.
pub const PROBLEM_GROUP: &str = "model";

/// Cloneable wrapper around a rule action's error.
///
/// A failed transition is never re-run, so the same failure is handed to
/// every later request that crosses it.
#[derive(Clone)]
pub struct RuleFailure(Arc<anyhow::Error>);

impl RuleFailure {
	pub fn new(error: anyhow::Error) -> Self {
		Self(Arc::new(error))
	}

	/// Converts a caught panic payload.
	pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
		let message = panic_message(payload.as_ref()).unwrap_or("non-string panic payload");
		Self::new(anyhow::anyhow!("rule action panicked: {message}"))
	}

	/// The underlying error.
	pub fn error(&self) -> &anyhow::Error {
		&self.0
	}

	/// Downcasts the underlying error.
	pub fn downcast_ref<E>(&self) -> Option<&E>
	where
		E: fmt::Display + fmt::Debug + Send + Sync + 'static,
	{
		self.0.downcast_ref::<E>()
	}
}

impl fmt::Display for RuleFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#}", self.0)
	}
}

impl fmt::Debug for RuleFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.0, f)
	}
}

impl std::error::Error for RuleFailure {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		(**self.0).source()
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some(msg);
	}
	payload.downcast_ref::<String>().map(String::as_str)
}
