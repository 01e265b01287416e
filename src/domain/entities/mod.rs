//! Domain Entities
//!
//! Core deployment entities that have identity and lifecycle.
//! - `Bundle` - A deployable unit discovered on storage
//! - `ClassloadingContext` - The loading scope composed for one application
//! - `ApplicationContext` - A fully configured, routable application
//! - `WebDescriptor` and friends - Parsed descriptor files
//! - `Realm` - Credential store for administrative authentication

mod bundle;
mod classload;
mod context;
mod descriptor;
mod realm;

pub use bundle::{Bundle, BundleKind, BundleLayout, BundleSet};
pub use classload::{ClassloadUnit, ClassloadingContext, UnitOutcome};
pub use context::{
    ApplicationContext, AttributeValue, Attributes, ContextDraft, TagLibrary,
    CONTENT_RESOLVER_ATTRIBUTE, HOST_CONTEXT_ATTRIBUTE,
};
pub use descriptor::{
    read_toml, ContextDescriptor, DescriptorError, FilterDef, PlatformOverrides, ServletDef,
    TagLibDecl, TagLibraryFile, WebDescriptor,
};
pub use realm::{Password, Realm, RealmError};
