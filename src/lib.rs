#![deny(rust_2018_idioms)]

//! A provider-composed, undoable property-editing engine for node-based
//! documents.
//!
//! When a host selects a node, registered providers assemble a grouped form
//! of editable entries for it; entry writes are expressed as commands and
//! run through an [`EditingContext`] that keeps an undo/redo history.

pub mod builtin;
pub mod command;
pub mod error;
pub mod io;
pub mod materialize;
pub mod model;
pub mod panel;
pub mod provider;
pub mod reference;

pub use command::{ChangeEvent, Command, EditingContext, PropertyPatch};
pub use error::ModelError;
pub use model::{Document, Node, NodeId, TypeTag};
pub use panel::{PropertiesPanel, Selection};
pub use provider::{Control, Entry, Group, PropertiesProvider, ProviderRegistry};

pub mod prelude {
    pub use super::{
        ChangeEvent, Command, Control, Document, EditingContext, Entry, Group, ModelError, Node,
        NodeId, PropertiesPanel, PropertiesProvider, PropertyPatch, ProviderRegistry, Selection,
        TypeTag,
    };
}
