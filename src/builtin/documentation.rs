use indexmap::IndexMap;

use crate::command::{ChangeEvent, Command};
use crate::materialize::ensure_container;
use crate::model::{Document, NodeId, TypeTag};
use crate::provider::{Control, Entry, Group, PropertiesProvider, normalized, upsert_group};

use super::{ElementKind, classify, tags};

/// "Documentation" group. The text lives on an optional `documentation`
/// child node: writing the first text materializes the child in the same
/// undo step, clearing the text detaches it again.
pub struct DocumentationProvider;

fn documentation_entry() -> Entry {
    let kind = TypeTag::from(tags::DOCUMENTATION);
    let read_kind = kind.clone();
    Entry::new(
        "documentation",
        "Documentation",
        Control::MultilineText,
        move |document, node| {
            document
                .child_of_kind(node, &read_kind)
                .and_then(|child| document.attribute(child, "text").cloned())
        },
        move |context, node, value| match normalized(value) {
            Some(text) => {
                let (container, mut commands) =
                    ensure_container(context.document_mut(), node, &kind, |document| {
                        let id = document.fresh_id("Documentation");
                        document.create_node(kind.clone(), id, IndexMap::new())
                    })?;
                commands.push(Command::set_property(container, "text", Some(text))?);
                context.execute(Command::batched(commands)?)
            }
            None => match context.document().child_of_kind(node, &kind) {
                Some(container) => context.execute(Command::detach(container)),
                None => Ok(ChangeEvent::default()),
            },
        },
    )
}

impl PropertiesProvider for DocumentationProvider {
    fn id(&self) -> &str {
        "documentation"
    }

    fn applies_to(&self, document: &Document, node: NodeId) -> bool {
        matches!(
            classify(document.node(node).kind()),
            Some(ElementKind::Process | ElementKind::Task | ElementKind::ErrorEvent)
        )
    }

    fn contribute(&self, _document: &Document, _node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        upsert_group(
            &mut groups,
            Group::fields("documentation", "Documentation", vec![documentation_entry()]),
        );
        groups
    }
}
