use serde_json::Value;

use crate::model::{Document, NodeId};
use crate::provider::{Entry, Group, PropertiesProvider, upsert_group};

use super::classify;

/// "General" group: element name plus a read-only id, for every element of
/// the builtin vocabulary.
pub struct GeneralProvider;

impl PropertiesProvider for GeneralProvider {
    fn id(&self) -> &str {
        "general"
    }

    fn applies_to(&self, document: &Document, node: NodeId) -> bool {
        classify(document.node(node).kind()).is_some()
    }

    fn contribute(&self, _document: &Document, _node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        let entries = vec![
            Entry::attribute_text("name", "Name", "name"),
            Entry::read_only("id", "Id", |document, node| {
                Some(Value::String(document.node(node).id().to_string()))
            }),
        ];
        upsert_group(&mut groups, Group::fields("general", "General", entries));
        groups
    }
}
