use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::ModelError;
use crate::model::{Document, NodeId};
use crate::panel::Selection;
use crate::provider::{Group, PropertiesProvider, ProviderRegistry};

use super::{Command, CommandKind, PropertyPatch};

/// Synchronous notification of a successful mutation, carrying the set of
/// nodes the command touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEvent {
    pub affected: Vec<NodeId>,
}

impl ChangeEvent {
    fn from_targets(mut affected: Vec<NodeId>) -> Self {
        affected.sort_unstable();
        affected.dedup();
        Self { affected }
    }

    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }
}

type ChangeListener = Box<dyn Fn(&ChangeEvent)>;

/// One editing session: the document, its undo/redo history, the provider
/// registry and the change listeners.
///
/// The context is passed explicitly into everything that needs it — there is
/// no ambient "current command stack" to look up. It is also the only writer
/// of the document: field bindings build commands and hand them to
/// [`EditingContext::execute`].
pub struct EditingContext {
    document: Document,
    registry: ProviderRegistry,
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    listeners: Vec<ChangeListener>,
}

impl EditingContext {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            registry: ProviderRegistry::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document arena.
    ///
    /// Only node *allocation* (and id claiming) is possible through this —
    /// attribute and tree mutators are crate-private, so every observable
    /// change still goes through [`EditingContext::execute`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn register(&mut self, provider: Box<dyn PropertiesProvider>) {
        self.registry.register(provider);
    }

    /// Subscribe to change notifications. Listeners are plain observers and
    /// fire synchronously after every successful execute/undo/redo.
    pub fn on_change(&mut self, listener: impl Fn(&ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn assemble(&self, selection: &Selection) -> Vec<Group> {
        self.registry.assemble(&self.document, selection)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Apply a command, record its inverse on the undo stack and clear the
    /// redo stack. Composite commands apply all-or-nothing: any member
    /// failing validation rolls back the already-applied prefix and leaves
    /// the document exactly as before the call.
    pub fn execute(&mut self, command: Command) -> Result<ChangeEvent, ModelError> {
        let mut targets = Vec::new();
        command.collect_targets(&mut targets);
        let inverse = apply(&mut self.document, command)?;
        self.undo_stack.push(inverse);
        self.redo_stack.clear();
        let event = ChangeEvent::from_targets(targets);
        debug!(affected = event.affected.len(), "command executed");
        self.notify(&event);
        Ok(event)
    }

    /// Revert the most recent command. A no-op when the history is empty.
    pub fn undo(&mut self) -> Result<Option<ChangeEvent>, ModelError> {
        let Some(inverse) = self.undo_stack.pop() else {
            trace!("undo on empty stack");
            return Ok(None);
        };
        let mut targets = Vec::new();
        inverse.collect_targets(&mut targets);
        let redo = apply(&mut self.document, inverse)?;
        self.redo_stack.push(redo);
        let event = ChangeEvent::from_targets(targets);
        debug!(affected = event.affected.len(), "undo");
        self.notify(&event);
        Ok(Some(event))
    }

    /// Re-apply the most recently undone command. A no-op when the redo
    /// stack is empty.
    pub fn redo(&mut self) -> Result<Option<ChangeEvent>, ModelError> {
        let Some(command) = self.redo_stack.pop() else {
            trace!("redo on empty stack");
            return Ok(None);
        };
        let mut targets = Vec::new();
        command.collect_targets(&mut targets);
        let inverse = apply(&mut self.document, command)?;
        self.undo_stack.push(inverse);
        let event = ChangeEvent::from_targets(targets);
        debug!(affected = event.affected.len(), "redo");
        self.notify(&event);
        Ok(Some(event))
    }

    fn notify(&self, event: &ChangeEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

/// Apply a command to the document, returning its inverse.
fn apply(document: &mut Document, command: Command) -> Result<Command, ModelError> {
    match command.kind {
        CommandKind::UpdateProperties {
            target,
            properties,
            positions,
        } => {
            document.ensure_attached(target)?;
            let mut prior = PropertyPatch::new();
            let mut prior_positions = IndexMap::new();
            for (key, value) in properties {
                let at = positions.get(&key).copied();
                let (previous, index) = document.set_attribute(target, &key, value, at);
                if let Some(index) = index {
                    prior_positions.insert(key.clone(), index);
                }
                prior.insert(key, previous);
            }
            Command::update_properties_at(target, prior, prior_positions)
        }
        CommandKind::Attach {
            parent,
            child,
            position,
        } => {
            document.ensure_attached(parent)?;
            if document.is_attached(child) {
                return Err(ModelError::StaleTarget {
                    id: document.node(child).id().to_string(),
                });
            }
            document.attach(parent, child, position)?;
            Ok(Command::detach(child))
        }
        CommandKind::Detach { child } => {
            document.ensure_attached(child)?;
            let (parent, position) = document.detach(child)?;
            Ok(Command::attach_at(parent, child, position))
        }
        CommandKind::Composite(commands) => {
            let mut applied = Vec::with_capacity(commands.len());
            for member in commands {
                match apply(document, member) {
                    Ok(inverse) => applied.push(inverse),
                    Err(error) => {
                        // Roll back the applied prefix in reverse order. The
                        // inverse of a just-applied command reapplies cleanly.
                        for inverse in applied.drain(..).rev() {
                            let rolled_back = apply(document, inverse);
                            debug_assert!(
                                rolled_back.is_ok(),
                                "rollback failed to reapply an inverse"
                            );
                        }
                        return Err(error);
                    }
                }
            }
            applied.reverse();
            Command::composite(applied)
        }
    }
}
