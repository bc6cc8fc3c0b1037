use tracing::trace;

use crate::command::{ChangeEvent, EditingContext};
use crate::model::NodeId;
use crate::provider::Group;

/// The external selection signal the engine consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(NodeId),
    Multi(Vec<NodeId>),
}

impl Selection {
    pub fn single(&self) -> Option<NodeId> {
        match self {
            Selection::Single(node) => Some(*node),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

/// Thin selection controller: holds the current selection and the last
/// assembled groups, re-running assembly on selection and document changes.
#[derive(Default)]
pub struct PropertiesPanel {
    selection: Selection,
    groups: Vec<Group>,
}

impl PropertiesPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn set_selection(&mut self, context: &EditingContext, selection: Selection) {
        self.selection = selection;
        self.refresh(context);
    }

    pub fn refresh(&mut self, context: &EditingContext) {
        self.groups = context.assemble(&self.selection);
    }

    /// React to a change notification. A selected node that was detached
    /// clears the selection; otherwise the form is re-assembled, since any
    /// document change can alter groups or option lists.
    pub fn document_changed(&mut self, context: &EditingContext, event: &ChangeEvent) {
        trace!(affected = event.affected.len(), "panel saw document change");
        if let Selection::Single(node) = self.selection {
            if !context.document().is_attached(node) {
                self.selection = Selection::None;
            }
        }
        self.refresh(context);
    }
}
