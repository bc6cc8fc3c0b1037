use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::command::{Command, EditingContext};
use crate::materialize::{ensure_container, prune_if_empty};
use crate::model::{Document, NodeId, TypeTag};
use crate::provider::{Entry, Group, ListItem, PropertiesProvider, upsert_group};

use super::{ElementKind, classify, tags};

/// "Extension properties" list group: key/value `property` items kept under
/// an optional `extensions` wrapper. Adding the first item materializes the
/// wrapper, removing the last one prunes it — both as single undo steps.
pub struct ExtensionPropertiesProvider;

fn wrapper_kind() -> TypeTag {
    TypeTag::from(tags::EXTENSIONS)
}

fn property_kind() -> TypeTag {
    TypeTag::from(tags::PROPERTY)
}

fn property_items(document: &Document, host: NodeId) -> Vec<ListItem> {
    let Some(wrapper) = document.child_of_kind(host, &wrapper_kind()) else {
        return Vec::new();
    };
    document
        .children_of_kind(wrapper, &property_kind())
        .into_iter()
        .map(|node| {
            let id = document.node(node).id().to_string();
            let label = document
                .attribute(node, "name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .unwrap_or(&id)
                .to_string();
            ListItem {
                id,
                label,
                node,
                entries: vec![
                    Entry::attribute_text("name", "Name", "name"),
                    Entry::attribute_text("value", "Value", "value"),
                ],
            }
        })
        .collect()
}

impl PropertiesProvider for ExtensionPropertiesProvider {
    fn id(&self) -> &str {
        "extension-properties"
    }

    fn applies_to(&self, document: &Document, node: NodeId) -> bool {
        matches!(
            classify(document.node(node).kind()),
            Some(ElementKind::Process | ElementKind::Task | ElementKind::ErrorEvent)
        )
    }

    fn contribute(&self, document: &Document, node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        let host = node;
        let add = Arc::new(move |context: &mut EditingContext| {
            let wrapper = wrapper_kind();
            let (container, mut commands) =
                ensure_container(context.document_mut(), host, &wrapper, |document| {
                    let id = document.fresh_id("Extensions");
                    document.create_node(wrapper.clone(), id, IndexMap::new())
                })?;
            let id = context.document().fresh_id("Property");
            let mut attributes = IndexMap::new();
            attributes.insert("name".to_string(), Value::String(String::new()));
            attributes.insert("value".to_string(), Value::String(String::new()));
            let item = context
                .document_mut()
                .create_node(property_kind(), id, attributes)?;
            commands.push(Command::attach(container, item));
            context.execute(Command::batched(commands)?)
        });
        let remove = Arc::new(
            move |context: &mut EditingContext, item: &ListItem| {
                let mut commands = vec![Command::detach(item.node)];
                if let Some(wrapper) = context.document().child_of_kind(host, &wrapper_kind()) {
                    if let Some(prune) = prune_if_empty(context.document(), wrapper, &[item.node]) {
                        commands.push(prune);
                    }
                }
                context.execute(Command::batched(commands)?)
            },
        );
        upsert_group(
            &mut groups,
            Group::list(
                "extension-properties",
                "Extension properties",
                property_items(document, node),
                add,
                remove,
            ),
        );
        groups
    }
}
