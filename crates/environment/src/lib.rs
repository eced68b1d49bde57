//! Collaborator facts consumed by the configuration model.
//!
//! Build properties and host platform facts are computed outside the model
//! and bound into it as pre-realized nodes, so rules can declare them as
//! ordinary inputs.

mod platform;
mod properties;
mod seed;

pub use platform::{Architecture, OperatingSystem, PlatformError, PlatformFacts};
pub use properties::{BuildProperties, DEFAULT_ENV_PREFIX, PropertiesError, PropertiesLoader, PropertyMap};
pub use seed::{seed_platform, seed_properties};
