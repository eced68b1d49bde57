//! Rule-driven configuration model.
//!
//! The model is a tree of nodes addressed by [`ModelPath`]. Each node holds a
//! [`Value`] and advances monotonically through [`LifecycleState`]s. Rules
//! declare which (path, state) transition they perform and which inputs they
//! need; nothing runs at registration time. Requesting a node at a state via
//! [`ModelRegistry::get`] realizes the dependency closure in order, executing
//! each rule at most once even under concurrent requests.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`ModelRegistry`] | Facade owning nodes and rules for one build. |
//! | [`ModelRule`] | Subject, inputs, descriptor and action of one rule. |
//! | [`RuleScope`] | What an action sees: inputs, subject value, active rules. |
//! | [`ExecutionContext`] | Per-request stack of active rule descriptors. |
//! | [`ModelError`] | Registration and realization failures with rule chains. |
//!
//! # Example
//!
//! ```
//! use cairn_model::{LifecycleState, ModelPath, ModelRegistry, ModelRule};
//!
//! let registry = ModelRegistry::new();
//! let version = ModelPath::parse("toolchain.version").unwrap();
//! let banner = ModelPath::parse("banner").unwrap();
//!
//! registry.seed(&version, 21_i64).unwrap();
//! registry
//! 	.register(
//! 		ModelRule::creator(banner.clone(), "banner", |scope| {
//! 			Ok(format!("jdk {}", scope.input_as::<i64>(0)?))
//! 		})
//! 		.input(version, LifecycleState::Closed),
//! 	)
//! 	.unwrap();
//!
//! let value = registry.get(&banner, LifecycleState::Finalized).unwrap();
//! assert_eq!(value.as_str(), Some("jdk 21"));
//! ```

mod binder;
pub mod config;
mod context;
mod descriptor;
mod error;
mod node;
pub mod path;
mod realize;
mod registry;
mod rule;
mod scope;
mod state;
mod value;

pub use config::{ConfigError, RegistryConfig};
pub use context::ExecutionContext;
pub use descriptor::{RuleChain, RuleDescriptor};
pub use error::{ModelError, PROBLEM_GROUP, RuleFailure};
pub use node::NodeInfo;
pub use path::{ModelPath, PathError};
pub use registry::ModelRegistry;
pub use rule::{ModelReference, ModelRule, RuleAction};
pub use scope::{InputError, RuleScope};
pub use state::{LifecycleState, UnknownState};
pub use value::{FromValue, ObjectValue, Value, ValueType};
