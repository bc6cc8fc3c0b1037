use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::ModelError;

use super::{Node, NodeId, TypeTag};

/// The authoritative document tree.
///
/// Nodes live in an arena indexed by [`NodeId`]; handles are referentially
/// stable because slots are never reused within a session. Tree membership
/// changes only through the command executor — the structural mutators here
/// are crate-private so field bindings cannot bypass the undo history.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
    root: NodeId,
}

impl Document {
    pub fn new(root_kind: TypeTag, root_id: impl Into<String>) -> Result<Self, ModelError> {
        let mut document = Self {
            nodes: Vec::new(),
            ids: HashMap::new(),
            root: NodeId(0),
        };
        let root = document.create_node(root_kind, root_id, IndexMap::new())?;
        document.root = root;
        Ok(document)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Resolve a string id to its node handle.
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn attribute(&self, node: NodeId, key: &str) -> Option<&Value> {
        self.node(node).attribute(key)
    }

    /// Allocate a node in the arena and claim its id.
    ///
    /// The node starts *detached*: it only becomes part of the tree through
    /// an attach command, so tree membership is always undoable.
    pub fn create_node(
        &mut self,
        kind: TypeTag,
        id: impl Into<String>,
        attributes: IndexMap<String, Value>,
    ) -> Result<NodeId, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyId);
        }
        if self.ids.contains_key(&id) {
            return Err(ModelError::DuplicateId { id });
        }
        let handle = NodeId(self.nodes.len() as u32);
        self.ids.insert(id.clone(), handle);
        self.nodes.push(Node::new(kind, id, attributes));
        Ok(handle)
    }

    /// Smallest unclaimed id of the form `{prefix}_{n}`, n >= 1.
    pub fn fresh_id(&self, prefix: &str) -> String {
        let mut n = 1usize;
        loop {
            let candidate = format!("{prefix}_{n}");
            if !self.ids.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Walk parent links to the top of the chain.
    ///
    /// The walk is step-bounded; exceeding the arena size means a cycle in
    /// the parent links, which is an invariant violation.
    pub fn find_root(&self, node: NodeId) -> Result<NodeId, ModelError> {
        let mut current = node;
        let mut steps = 0usize;
        while let Some(parent) = self.node(current).parent {
            current = parent;
            steps += 1;
            if steps > self.nodes.len() {
                return Err(ModelError::DetachedNode {
                    id: self.node(node).id.clone(),
                });
            }
        }
        Ok(current)
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        matches!(self.find_root(node), Ok(top) if top == self.root)
    }

    pub(crate) fn ensure_attached(&self, node: NodeId) -> Result<(), ModelError> {
        match self.find_root(node)? {
            top if top == self.root => Ok(()),
            _ => Err(ModelError::StaleTarget {
                id: self.node(node).id.clone(),
            }),
        }
    }

    /// First child of `parent` with a matching kind.
    pub fn child_of_kind(&self, parent: NodeId, kind: &TypeTag) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).kind == *kind)
    }

    /// All children of `parent` with a matching kind, in document order.
    pub fn children_of_kind(&self, parent: NodeId, kind: &TypeTag) -> Vec<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .filter(|child| self.node(*child).kind == *kind)
            .collect()
    }

    /// Direct children of the root with a matching kind — the named global
    /// objects other nodes reference by id.
    pub fn global_objects_of_kind(&self, kind: &TypeTag) -> Vec<NodeId> {
        self.children_of_kind(self.root, kind)
    }

    /// Structural snapshot of a subtree: kind, id, attributes and children,
    /// recursively. Doubles as the persistence shape and as the
    /// structural-equality witness in tests.
    pub fn structure(&self, node: NodeId) -> Value {
        let n = self.node(node);
        let mut attributes = Map::new();
        for (key, value) in &n.attributes {
            attributes.insert(key.clone(), value.clone());
        }
        let children: Vec<Value> = n
            .children
            .iter()
            .map(|child| self.structure(*child))
            .collect();
        let mut out = Map::new();
        out.insert("kind".into(), Value::String(n.kind.as_str().to_string()));
        out.insert("id".into(), Value::String(n.id.clone()));
        out.insert("attributes".into(), Value::Object(attributes));
        out.insert("children".into(), Value::Array(children));
        Value::Object(out)
    }

    /// Write, re-insert or remove an attribute, returning the prior value
    /// and, for a removal, the index the key occupied.
    ///
    /// A `position` re-inserts an absent key at its old index so that
    /// undoing a removal restores attribute order exactly; writes to a
    /// present key keep its index regardless.
    pub(crate) fn set_attribute(
        &mut self,
        node: NodeId,
        key: &str,
        value: Option<Value>,
        position: Option<usize>,
    ) -> (Option<Value>, Option<usize>) {
        let attributes = &mut self.nodes[node.index()].attributes;
        match value {
            Some(value) => match position {
                Some(index) if !attributes.contains_key(key) => {
                    let at = index.min(attributes.len());
                    attributes.shift_insert(at, key.to_string(), value);
                    (None, None)
                }
                _ => (attributes.insert(key.to_string(), value), None),
            },
            None => match attributes.shift_remove_full(key) {
                Some((index, _, previous)) => (Some(previous), Some(index)),
                None => (None, None),
            },
        }
    }

    pub(crate) fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        position: Option<usize>,
    ) -> Result<(), ModelError> {
        if self.nodes[child.index()].parent.is_some() {
            return Err(ModelError::StaleTarget {
                id: self.node(child).id.clone(),
            });
        }
        self.nodes[child.index()].parent = Some(parent);
        let children = &mut self.nodes[parent.index()].children;
        let at = position.unwrap_or(children.len()).min(children.len());
        children.insert(at, child);
        Ok(())
    }

    pub(crate) fn detach(&mut self, child: NodeId) -> Result<(NodeId, usize), ModelError> {
        let Some(parent) = self.nodes[child.index()].parent.take() else {
            return Err(ModelError::StaleTarget {
                id: self.node(child).id.clone(),
            });
        };
        let children = &mut self.nodes[parent.index()].children;
        let Some(position) = children.iter().position(|c| *c == child) else {
            return Err(ModelError::DetachedNode {
                id: self.node(child).id.clone(),
            });
        };
        children.remove(position);
        Ok((parent, position))
    }
}
