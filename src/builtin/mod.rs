//! Illustrative provider vocabulary.
//!
//! A small element vocabulary and four providers, enough to exercise every
//! engine mechanism: plain attribute bindings, an optional single-child
//! container, a repeatable item collection under a lazily materialized
//! wrapper, and a reference field over named globals. Hosts with their own
//! vocabulary register their own providers instead.

mod documentation;
mod error_reference;
mod extensions;
mod general;

use crate::model::TypeTag;
use crate::provider::ProviderRegistry;

pub use documentation::DocumentationProvider;
pub use error_reference::ErrorReferenceProvider;
pub use extensions::ExtensionPropertiesProvider;
pub use general::GeneralProvider;

/// Type tags of the builtin vocabulary.
pub mod tags {
    pub const PROCESS: &str = "process";
    pub const TASK: &str = "task";
    pub const ERROR_EVENT: &str = "error-event";
    pub const ERROR: &str = "error";
    pub const DOCUMENTATION: &str = "documentation";
    pub const EXTENSIONS: &str = "extensions";
    pub const PROPERTY: &str = "property";
}

/// Closed enum over the builtin vocabulary; providers dispatch by pattern
/// match instead of scattering tag-string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Process,
    Task,
    ErrorEvent,
    ErrorDefinition,
    Documentation,
    Extensions,
    ExtensionProperty,
}

/// Classify a tag into the builtin vocabulary. Unknown tags are simply not
/// ours — the registry stays open for third-party vocabularies.
pub fn classify(tag: &TypeTag) -> Option<ElementKind> {
    match tag.as_str() {
        tags::PROCESS => Some(ElementKind::Process),
        tags::TASK => Some(ElementKind::Task),
        tags::ERROR_EVENT => Some(ElementKind::ErrorEvent),
        tags::ERROR => Some(ElementKind::ErrorDefinition),
        tags::DOCUMENTATION => Some(ElementKind::Documentation),
        tags::EXTENSIONS => Some(ElementKind::Extensions),
        tags::PROPERTY => Some(ElementKind::ExtensionProperty),
        _ => None,
    }
}

/// Registry preloaded with the builtin providers.
pub fn default_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(GeneralProvider));
    registry.register(Box::new(DocumentationProvider));
    registry.register(Box::new(ExtensionPropertiesProvider));
    registry.register(Box::new(ErrorReferenceProvider));
    registry
}
