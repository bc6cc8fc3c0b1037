use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::command::{ChangeEvent, Command, EditingContext};
use crate::error::ModelError;
use crate::model::{Document, NodeId};
use crate::reference::RefOption;

/// Widget shape of an entry. Purely descriptive — rendering is the host's
/// concern.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Text,
    MultilineText,
    Checkbox,
    ReadOnly,
    Select { options: Vec<RefOption> },
}

impl Control {
    fn describe(&self) -> Value {
        match self {
            Control::Text => Value::String("text".into()),
            Control::MultilineText => Value::String("multiline-text".into()),
            Control::Checkbox => Value::String("checkbox".into()),
            Control::ReadOnly => Value::String("read-only".into()),
            Control::Select { options } => {
                let options: Vec<Value> = options
                    .iter()
                    .map(|option| {
                        let mut out = Map::new();
                        out.insert("value".into(), Value::String(option.value.clone()));
                        out.insert("label".into(), Value::String(option.label.clone()));
                        Value::Object(out)
                    })
                    .collect();
                let mut out = Map::new();
                out.insert("select".into(), Value::Array(options));
                Value::Object(out)
            }
        }
    }
}

/// Transient state of a rendered widget, fed to the `is_edited` predicate.
#[derive(Debug, Clone, Default)]
pub struct EntryRenderState {
    pub draft: Option<Value>,
    pub committed: Option<Value>,
}

pub type GetValueFn = Arc<dyn Fn(&Document, NodeId) -> Option<Value>>;
pub type SetValueFn =
    Arc<dyn Fn(&mut EditingContext, NodeId, Option<Value>) -> Result<ChangeEvent, ModelError>>;
pub type IsEditedFn = fn(&EntryRenderState) -> bool;

fn draft_differs(state: &EntryRenderState) -> bool {
    state.draft != state.committed
}

/// One editable field: a read accessor, a write accessor that routes through
/// the command executor, and a touched-indicator predicate.
#[derive(Clone)]
pub struct Entry {
    pub id: String,
    pub label: String,
    pub control: Control,
    get: GetValueFn,
    set: SetValueFn,
    is_edited: IsEditedFn,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("control", &self.control)
            .finish()
    }
}

impl Entry {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        control: Control,
        get: impl Fn(&Document, NodeId) -> Option<Value> + 'static,
        set: impl Fn(&mut EditingContext, NodeId, Option<Value>) -> Result<ChangeEvent, ModelError>
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            control,
            get: Arc::new(get),
            set: Arc::new(set),
            is_edited: draft_differs,
        }
    }

    pub fn with_is_edited(mut self, predicate: IsEditedFn) -> Self {
        self.is_edited = predicate;
        self
    }

    /// Pure read of the current model state.
    pub fn get(&self, document: &Document, node: NodeId) -> Option<Value> {
        (*self.get)(document, node)
    }

    /// Write through the command executor. Never mutates the document
    /// directly.
    pub fn set(
        &self,
        context: &mut EditingContext,
        node: NodeId,
        value: Option<Value>,
    ) -> Result<ChangeEvent, ModelError> {
        (*self.set)(context, node, value)
    }

    /// Visual "touched" indicator over the widget's transient state; no
    /// model effect.
    pub fn is_edited(&self, state: &EntryRenderState) -> bool {
        (self.is_edited)(state)
    }

    /// Entry bound to a plain attribute on the selected node. An empty value
    /// removes the attribute.
    pub fn attribute_text(
        id: impl Into<String>,
        label: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::attribute_control(id, label, key, Control::Text)
    }

    pub fn attribute_control(
        id: impl Into<String>,
        label: impl Into<String>,
        key: impl Into<String>,
        control: Control,
    ) -> Self {
        let key = key.into();
        let read_key = key.clone();
        Self::new(
            id,
            label,
            control,
            move |document, node| document.attribute(node, &read_key).cloned(),
            move |context, node, value| {
                let value = normalized(value);
                if value.is_none() && context.document().attribute(node, &key).is_none() {
                    return Ok(ChangeEvent::default());
                }
                context.execute(Command::set_property(node, &key, value)?)
            },
        )
    }

    /// Read-only entry; writing fails with a command-definition error.
    pub fn read_only(
        id: impl Into<String>,
        label: impl Into<String>,
        get: impl Fn(&Document, NodeId) -> Option<Value> + 'static,
    ) -> Self {
        let id = id.into();
        let entry_id = id.clone();
        Self::new(
            id,
            label,
            Control::ReadOnly,
            get,
            move |_context, _node, _value| {
                Err(ModelError::CommandDefinition(format!(
                    "entry `{entry_id}` is read-only"
                )))
            },
        )
    }

    fn describe(&self, document: &Document, node: NodeId) -> Value {
        let mut out = Map::new();
        out.insert("id".into(), Value::String(self.id.clone()));
        out.insert("label".into(), Value::String(self.label.clone()));
        out.insert("control".into(), self.control.describe());
        out.insert("value".into(), self.get(document, node).unwrap_or(Value::Null));
        Value::Object(out)
    }
}

/// Treat absent, null and empty-string values uniformly as "no value".
pub fn normalized(value: Option<Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(value) => Some(value),
    }
}

pub type AddItemFn = Arc<dyn Fn(&mut EditingContext) -> Result<ChangeEvent, ModelError>>;
pub type RemoveItemFn =
    Arc<dyn Fn(&mut EditingContext, &ListItem) -> Result<ChangeEvent, ModelError>>;

/// One item of a list group, bound to its own node.
#[derive(Clone)]
pub struct ListItem {
    pub id: String,
    pub label: String,
    pub node: NodeId,
    pub entries: Vec<Entry>,
}

impl fmt::Debug for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListItem")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("node", &self.node)
            .field("entries", &self.entries)
            .finish()
    }
}

/// Body of a group: a flat field list, or a repeatable item collection with
/// add/remove handlers.
#[derive(Clone)]
pub enum GroupBody {
    Fields(Vec<Entry>),
    List {
        items: Vec<ListItem>,
        add: AddItemFn,
        remove: RemoveItemFn,
    },
}

/// A labeled section of the property form. Derived, short-lived, recomputed
/// on every selection or document change.
#[derive(Clone)]
pub struct Group {
    pub id: String,
    pub label: String,
    pub body: GroupBody,
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Group");
        out.field("id", &self.id).field("label", &self.label);
        match &self.body {
            GroupBody::Fields(entries) => out.field("entries", entries),
            GroupBody::List { items, .. } => out.field("items", items),
        };
        out.finish()
    }
}

impl Group {
    pub fn fields(id: impl Into<String>, label: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            body: GroupBody::Fields(entries),
        }
    }

    pub fn list(
        id: impl Into<String>,
        label: impl Into<String>,
        items: Vec<ListItem>,
        add: AddItemFn,
        remove: RemoveItemFn,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            body: GroupBody::List { items, add, remove },
        }
    }

    /// Empty groups are dropped from assembly output, never rendered.
    pub fn is_empty(&self) -> bool {
        match &self.body {
            GroupBody::Fields(entries) => entries.is_empty(),
            GroupBody::List { items, .. } => items.is_empty(),
        }
    }

    pub fn entries(&self) -> Option<&[Entry]> {
        match &self.body {
            GroupBody::Fields(entries) => Some(entries),
            GroupBody::List { .. } => None,
        }
    }

    pub fn entry(&self, id: &str) -> Option<&Entry> {
        self.entries()
            .and_then(|entries| entries.iter().find(|entry| entry.id == id))
    }

    pub fn items(&self) -> Option<&[ListItem]> {
        match &self.body {
            GroupBody::List { items, .. } => Some(items),
            GroupBody::Fields(_) => None,
        }
    }

    /// Run the add handler of a list group.
    pub fn add_item(&self, context: &mut EditingContext) -> Result<ChangeEvent, ModelError> {
        match &self.body {
            GroupBody::List { add, .. } => (**add)(context),
            GroupBody::Fields(_) => Err(ModelError::CommandDefinition(format!(
                "group `{}` is not a list group",
                self.id
            ))),
        }
    }

    /// Run the remove handler of a list group for one of its items.
    pub fn remove_item(
        &self,
        context: &mut EditingContext,
        item: &ListItem,
    ) -> Result<ChangeEvent, ModelError> {
        match &self.body {
            GroupBody::List { remove, .. } => (**remove)(context, item),
            GroupBody::Fields(_) => Err(ModelError::CommandDefinition(format!(
                "group `{}` is not a list group",
                self.id
            ))),
        }
    }

    /// Replace an entry with a matching id, or append — the standard
    /// override idiom for providers layering on top of an earlier one.
    pub fn upsert_entry(&mut self, entry: Entry) {
        let GroupBody::Fields(entries) = &mut self.body else {
            return;
        };
        match entries.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    pub fn remove_entry(&mut self, id: &str) -> bool {
        let GroupBody::Fields(entries) = &mut self.body else {
            return false;
        };
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// JSON description of the group for a given selection — ids, labels,
    /// controls and current values. Used by hosts that render remotely and
    /// by structural assertions in tests.
    pub fn describe(&self, document: &Document, node: NodeId) -> Value {
        let mut out = Map::new();
        out.insert("id".into(), Value::String(self.id.clone()));
        out.insert("label".into(), Value::String(self.label.clone()));
        match &self.body {
            GroupBody::Fields(entries) => {
                let entries: Vec<Value> = entries
                    .iter()
                    .map(|entry| entry.describe(document, node))
                    .collect();
                out.insert("entries".into(), Value::Array(entries));
            }
            GroupBody::List { items, .. } => {
                let items: Vec<Value> = items
                    .iter()
                    .map(|item| {
                        let mut body = Map::new();
                        body.insert("id".into(), Value::String(item.id.clone()));
                        body.insert("label".into(), Value::String(item.label.clone()));
                        let entries: Vec<Value> = item
                            .entries
                            .iter()
                            .map(|entry| entry.describe(document, item.node))
                            .collect();
                        body.insert("entries".into(), Value::Array(entries));
                        Value::Object(body)
                    })
                    .collect();
                out.insert("items".into(), Value::Array(items));
            }
        }
        Value::Object(out)
    }
}

/// Find a group by id in the running assembly list.
pub fn group_by_id_mut<'a>(groups: &'a mut [Group], id: &str) -> Option<&'a mut Group> {
    groups.iter_mut().find(|group| group.id == id)
}

/// Replace a group with a matching id wholesale, or append it.
pub fn upsert_group(groups: &mut Vec<Group>, group: Group) {
    match groups.iter_mut().find(|existing| existing.id == group.id) {
        Some(existing) => *existing = group,
        None => groups.push(group),
    }
}

pub fn remove_group(groups: &mut Vec<Group>, id: &str) -> bool {
    let before = groups.len();
    groups.retain(|group| group.id != id);
    groups.len() != before
}
