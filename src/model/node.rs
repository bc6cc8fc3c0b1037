use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

/// Stable handle to a node inside a [`Document`](super::Document) arena.
///
/// Handles stay valid for the lifetime of the document: detaching a node
/// removes it from the tree but never deallocates its slot, so a handle
/// fetched earlier is always safe to pass back into a command (the executor
/// rejects it with a stale-target error if the node is no longer attached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Vocabulary kind of a node.
///
/// The engine core only ever compares tags; closed-enum dispatch over a
/// concrete vocabulary lives with the providers that define it (see
/// [`builtin::classify`](crate::builtin::classify)).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(String);

impl TypeTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl From<String> for TypeTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single element of the document tree: a type tag, a document-unique
/// string id, an ordered attribute map, ordered children and a non-owning
/// parent back-link.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: TypeTag,
    pub(crate) id: String,
    pub(crate) attributes: IndexMap<String, Value>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: TypeTag, id: String, attributes: IndexMap<String, Value>) -> Self {
        Self {
            kind,
            id,
            attributes,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn kind(&self) -> &TypeTag {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Attribute lookup; an absent key is not an error.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}
