//! Lazy materialization of optional wrapper nodes.
//!
//! Many features hang their data off a wrapper node that should only exist
//! while it has content. These helpers express wrapper creation and pruning
//! as ordinary commands so they land in the *same* composite as the
//! substantive edit — the wrapper and its first child appear as one undo
//! step, and undoing the last removal restores the tree shape exactly.

use crate::command::Command;
use crate::error::ModelError;
use crate::model::{Document, NodeId, TypeTag};

/// Return the existing child of `kind` under `host`, or allocate one via the
/// factory together with the attach command that puts it in the tree.
///
/// The caller must *prepend* the returned commands to its own composite so
/// the container and its first piece of content are created atomically.
pub fn ensure_container<F>(
    document: &mut Document,
    host: NodeId,
    kind: &TypeTag,
    factory: F,
) -> Result<(NodeId, Vec<Command>), ModelError>
where
    F: FnOnce(&mut Document) -> Result<NodeId, ModelError>,
{
    if let Some(existing) = document.child_of_kind(host, kind) {
        return Ok((existing, Vec::new()));
    }
    let container = factory(document)?;
    Ok((container, vec![Command::attach(host, container)]))
}

/// If removing `removing` leaves `container` without children, return the
/// command that detaches the wrapper; callers append it after any removal
/// that might have emptied the container.
pub fn prune_if_empty(
    document: &Document,
    container: NodeId,
    removing: &[NodeId],
) -> Option<Command> {
    let remaining = document
        .node(container)
        .children()
        .iter()
        .any(|child| !removing.contains(child));
    if remaining {
        None
    } else {
        Some(Command::detach(container))
    }
}
