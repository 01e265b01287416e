//! Domain Layer
//!
//! Pure deployment model: bundles, application contexts, classloading units,
//! descriptors and the ports the engine consumes from its host.
//!
//! ## Structure
//!
//! - `entities/` - Bundle, ApplicationContext, ClassloadingContext, descriptors, Realm
//! - `value_objects/` - Identity, ContextPath, LifecycleState, ConfigurationStep
//! - `ports/` - Host-provided capabilities (code loading, request routing, events)

pub mod entities;
pub mod ports;
pub mod value_objects;
