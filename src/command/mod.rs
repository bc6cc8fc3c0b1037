mod executor;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ModelError;
use crate::model::NodeId;

pub use executor::{ChangeEvent, EditingContext};

/// Attribute patch applied by an update command. `None` removes the key.
pub type PropertyPatch = IndexMap<String, Option<Value>>;

/// A reversible mutation of the document tree.
///
/// Commands are built through the validating constructors below; a malformed
/// command fails with [`ModelError::CommandDefinition`] before the model is
/// ever touched. Applying a command yields its inverse, which is what the
/// undo history stores.
#[derive(Debug, Clone)]
pub struct Command {
    pub(crate) kind: CommandKind,
}

#[derive(Debug, Clone)]
pub(crate) enum CommandKind {
    UpdateProperties {
        target: NodeId,
        properties: PropertyPatch,
        /// Old indices of removed keys, so the inverse re-inserts them in
        /// place and undo restores attribute order exactly. Only inverse
        /// commands built by the executor carry entries here.
        positions: IndexMap<String, usize>,
    },
    Attach {
        parent: NodeId,
        child: NodeId,
        position: Option<usize>,
    },
    Detach {
        child: NodeId,
    },
    Composite(Vec<Command>),
}

impl Command {
    /// Patch one or more attributes on an attached node.
    pub fn update_properties(
        target: NodeId,
        properties: PropertyPatch,
    ) -> Result<Self, ModelError> {
        Self::update_properties_at(target, properties, IndexMap::new())
    }

    pub(crate) fn update_properties_at(
        target: NodeId,
        properties: PropertyPatch,
        positions: IndexMap<String, usize>,
    ) -> Result<Self, ModelError> {
        if properties.is_empty() {
            return Err(ModelError::CommandDefinition(
                "update requires at least one property".into(),
            ));
        }
        if properties.keys().any(|key| key.is_empty()) {
            return Err(ModelError::CommandDefinition(
                "property keys must not be empty".into(),
            ));
        }
        Ok(Self {
            kind: CommandKind::UpdateProperties {
                target,
                properties,
                positions,
            },
        })
    }

    /// Single-attribute convenience over [`Command::update_properties`].
    pub fn set_property(
        target: NodeId,
        key: &str,
        value: Option<Value>,
    ) -> Result<Self, ModelError> {
        let mut properties = PropertyPatch::new();
        properties.insert(key.to_string(), value);
        Self::update_properties(target, properties)
    }

    /// Attach a detached node at the end of `parent`'s children.
    pub fn attach(parent: NodeId, child: NodeId) -> Self {
        Self {
            kind: CommandKind::Attach {
                parent,
                child,
                position: None,
            },
        }
    }

    /// Attach a detached node at a specific position.
    pub fn attach_at(parent: NodeId, child: NodeId, position: usize) -> Self {
        Self {
            kind: CommandKind::Attach {
                parent,
                child,
                position: Some(position),
            },
        }
    }

    /// Detach a node (and its subtree) from its parent.
    pub fn detach(child: NodeId) -> Self {
        Self {
            kind: CommandKind::Detach { child },
        }
    }

    /// Bundle commands into one atomic, atomically-undoable unit.
    pub fn composite(commands: Vec<Command>) -> Result<Self, ModelError> {
        if commands.is_empty() {
            return Err(ModelError::CommandDefinition(
                "composite requires at least one command".into(),
            ));
        }
        Ok(Self {
            kind: CommandKind::Composite(commands),
        })
    }

    /// One command as-is, several as a composite.
    pub fn batched(mut commands: Vec<Command>) -> Result<Self, ModelError> {
        if commands.len() == 1 {
            return commands.pop().ok_or_else(|| {
                ModelError::CommandDefinition("batch requires at least one command".into())
            });
        }
        Self::composite(commands)
    }

    pub(crate) fn collect_targets(&self, out: &mut Vec<NodeId>) {
        match &self.kind {
            CommandKind::UpdateProperties { target, .. } => out.push(*target),
            CommandKind::Attach { parent, child, .. } => {
                out.push(*parent);
                out.push(*child);
            }
            CommandKind::Detach { child } => out.push(*child),
            CommandKind::Composite(commands) => {
                for command in commands {
                    command.collect_targets(out);
                }
            }
        }
    }
}
