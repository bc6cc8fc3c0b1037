//! Resolution of reference-typed fields.
//!
//! A reference field stores the string id of a named global object — a
//! direct child of the document root — rather than containing the object.
//! This module builds the selectable option list (including the synthetic
//! "none" and "create new" choices) and resolves a selection back to a node,
//! synthesizing a new global on the fly when asked to.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::command::Command;
use crate::error::ModelError;
use crate::model::{Document, NodeId, TypeTag};

/// Sentinel value meaning "create a new target and point to it".
pub const CREATE_NEW: &str = "create-new";

/// One selectable option of a reference field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefOption {
    pub value: String,
    pub label: String,
}

/// Display label of a global object: its `name` attribute, falling back to
/// the id.
pub fn display_label(document: &Document, node: NodeId) -> String {
    document
        .attribute(node, "name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(document.node(node).id())
        .to_string()
}

/// Options for a reference field over globals of `kind`: the synthetic
/// "none" option first, the "create new" sentinel second, then one option
/// per existing global sorted case-insensitively by label, ties broken by
/// document order.
pub fn list_options(document: &Document, kind: &TypeTag) -> Vec<RefOption> {
    let mut options = vec![
        RefOption {
            value: String::new(),
            label: "<none>".to_string(),
        },
        RefOption {
            value: CREATE_NEW.to_string(),
            label: "Create new ...".to_string(),
        },
    ];
    let mut existing: Vec<(String, usize, String)> = document
        .global_objects_of_kind(kind)
        .into_iter()
        .enumerate()
        .map(|(position, node)| {
            (
                display_label(document, node),
                position,
                document.node(node).id().to_string(),
            )
        })
        .collect();
    existing.sort_by(|a, b| {
        a.0.to_lowercase()
            .cmp(&b.0.to_lowercase())
            .then(a.1.cmp(&b.1))
    });
    options.extend(
        existing
            .into_iter()
            .map(|(label, _, id)| RefOption { value: id, label }),
    );
    options
}

/// Id prefix for freshly created globals of `kind`: `error-event` becomes
/// `ErrorEvent`.
pub fn id_prefix(kind: &TypeTag) -> String {
    kind.as_str()
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Resolve a reference-field selection to a target node plus the prefix
/// commands the caller must bundle with its own "store the reference"
/// command in one composite.
///
/// - empty selection: no reference, no commands;
/// - [`CREATE_NEW`]: a fresh global is allocated via the factory (which
///   receives a fresh unique id) and the attach-to-root command is returned;
/// - an id: looked up among the existing globals of `kind`;
///   [`ModelError::UnknownReference`] is recoverable — callers degrade the
///   field to "no reference" instead of failing the form.
pub fn resolve_selection<F>(
    document: &mut Document,
    kind: &TypeTag,
    selected: &str,
    factory: F,
) -> Result<(Option<NodeId>, Vec<Command>), ModelError>
where
    F: FnOnce(&mut Document, &str) -> Result<NodeId, ModelError>,
{
    if selected.is_empty() {
        return Ok((None, Vec::new()));
    }
    if selected == CREATE_NEW {
        let id = document.fresh_id(&id_prefix(kind));
        let root = document.root();
        let node = factory(document, &id)?;
        return Ok((Some(node), vec![Command::attach(root, node)]));
    }
    let found = document
        .global_objects_of_kind(kind)
        .into_iter()
        .find(|node| document.node(*node).id() == selected);
    match found {
        Some(node) => Ok((Some(node), Vec::new())),
        None => Err(ModelError::UnknownReference {
            id: selected.to_string(),
        }),
    }
}
