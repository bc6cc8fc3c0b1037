use indexmap::IndexMap;
use serde_json::Value;

use crate::command::{ChangeEvent, Command};
use crate::error::ModelError;
use crate::model::{Document, NodeId, TypeTag};
use crate::provider::{Control, Entry, Group, PropertiesProvider, upsert_group};
use crate::reference::{list_options, resolve_selection};

use super::{ElementKind, classify, tags};

const REF_KEY: &str = "error-ref";

/// "Error" group for error events: a reference select over the document's
/// `error` globals, including the create-new choice. Selecting "create new"
/// synthesizes the error definition and points at it in one undo step.
pub struct ErrorReferenceProvider;

fn error_kind() -> TypeTag {
    TypeTag::from(tags::ERROR)
}

fn new_error(document: &mut Document, id: &str) -> Result<NodeId, ModelError> {
    let mut attributes = IndexMap::new();
    attributes.insert("name".to_string(), Value::String(id.to_string()));
    document.create_node(error_kind(), id, attributes)
}

fn reference_entry(document: &Document) -> Entry {
    let kind = error_kind();
    let options = list_options(document, &kind);
    Entry::new(
        REF_KEY,
        "Error reference",
        Control::Select { options },
        |document, node| document.attribute(node, REF_KEY).cloned(),
        move |context, node, value| {
            let selected = value
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let resolution =
                resolve_selection(context.document_mut(), &kind, &selected, new_error);
            let (resolved, mut commands) = match resolution {
                Ok(resolution) => resolution,
                // A dangling id degrades to "no reference" instead of
                // failing the edit.
                Err(ModelError::UnknownReference { .. }) => (None, Vec::new()),
                Err(error) => return Err(error),
            };
            let stored = resolved.map(|target| {
                Value::String(context.document().node(target).id().to_string())
            });
            if stored.is_none()
                && commands.is_empty()
                && context.document().attribute(node, REF_KEY).is_none()
            {
                return Ok(ChangeEvent::default());
            }
            commands.push(Command::set_property(node, REF_KEY, stored)?);
            context.execute(Command::batched(commands)?)
        },
    )
}

impl PropertiesProvider for ErrorReferenceProvider {
    fn id(&self) -> &str {
        "error-reference"
    }

    fn applies_to(&self, document: &Document, node: NodeId) -> bool {
        matches!(
            classify(document.node(node).kind()),
            Some(ElementKind::ErrorEvent)
        )
    }

    fn contribute(&self, document: &Document, _node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        upsert_group(
            &mut groups,
            Group::fields("error", "Error", vec![reference_entry(document)]),
        );
        groups
    }
}
