mod groups;

use tracing::trace;

use crate::model::{Document, NodeId};
use crate::panel::Selection;

pub use groups::{
    AddItemFn, Control, Entry, EntryRenderState, GetValueFn, Group, GroupBody, IsEditedFn,
    ListItem, RemoveItemFn, SetValueFn, group_by_id_mut, normalized, remove_group, upsert_group,
};

/// A pluggable contributor of editable field groups for a selection.
///
/// Providers run in ascending priority order (registration order breaks
/// ties); each receives the group list assembled so far and returns the
/// updated list — appending groups, replacing groups or entries by id, or
/// filtering groups out. That ordering is the whole coupling contract
/// between providers: a later provider may rewrite what an earlier one
/// produced, but only through the list it was handed.
pub trait PropertiesProvider {
    fn id(&self) -> &str;

    /// Lower numbers run earlier. Defaults to 100.
    fn priority(&self) -> i32 {
        100
    }

    /// Capability predicate: whether this provider produces anything for the
    /// given node. Returning false skips `contribute` entirely.
    fn applies_to(&self, _document: &Document, _node: NodeId) -> bool {
        true
    }

    /// Transform the running group list for the selected node. Must be a
    /// pure function of the document and the node — assembly is recomputed
    /// on every selection or document change.
    fn contribute(&self, document: &Document, node: NodeId, groups: Vec<Group>) -> Vec<Group>;
}

/// Priority-ordered, append-only list of providers with session lifetime.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn PropertiesProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider. The list is kept stably sorted by priority, so
    /// equal priorities keep their registration order.
    pub fn register(&mut self, provider: Box<dyn PropertiesProvider>) {
        self.providers.push(provider);
        self.providers.sort_by_key(|provider| provider.priority());
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run the selection through every applicable provider and drop groups
    /// that ended up empty. Deterministic for a fixed document, selection
    /// and registry.
    ///
    /// Multi-selection never renders editable fields, so anything other
    /// than a single node yields an empty list.
    pub fn assemble(&self, document: &Document, selection: &Selection) -> Vec<Group> {
        let Selection::Single(node) = selection else {
            return Vec::new();
        };
        let node = *node;
        let mut groups = Vec::new();
        for provider in &self.providers {
            if !provider.applies_to(document, node) {
                continue;
            }
            trace!(provider = provider.id(), "contributing groups");
            groups = provider.contribute(document, node, groups);
        }
        groups.retain(|group| !group.is_empty());
        groups
    }
}
