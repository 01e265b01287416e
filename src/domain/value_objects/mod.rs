//! Domain Value Objects
//!
//! Immutable value types that represent deployment concepts.

mod config_warning;
mod identity;
mod lifecycle;
mod step;

pub use config_warning::ConfigWarning;
pub use identity::{ContextPath, Identity};
pub use lifecycle::LifecycleState;
pub use step::ConfigurationStep;
