use serde_json::{Value, json};

use propsheet::builtin::{self, ElementKind, classify};
use propsheet::io::decode_document;
use propsheet::provider::{group_by_id_mut, remove_group};
use propsheet::{
    Control, Document, EditingContext, Entry, Group, NodeId, PropertiesProvider, ProviderRegistry,
    Selection, TypeTag,
};

fn fixture() -> Document {
    decode_document(&json!({
        "kind": "process",
        "id": "Process_1",
        "children": [
            {"kind": "task", "id": "Task_1", "attributes": {"name": "Collect order"}},
            {"kind": "error-event", "id": "ErrorEvent_1"},
            {"kind": "error", "id": "Error_1", "attributes": {"name": "Timeout"}}
        ]
    }))
    .expect("fixture document")
}

fn node(document: &Document, id: &str) -> NodeId {
    document.lookup(id).expect("node exists")
}

fn shape(groups: &[Group]) -> Vec<(String, Vec<(String, String)>)> {
    groups
        .iter()
        .map(|group| {
            let entries = group
                .entries()
                .unwrap_or(&[])
                .iter()
                .map(|entry| (entry.id.clone(), entry.label.clone()))
                .collect();
            (group.id.clone(), entries)
        })
        .collect()
}

struct BaseProvider;

impl PropertiesProvider for BaseProvider {
    fn id(&self) -> &str {
        "base"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn contribute(&self, _document: &Document, _node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        groups.push(Group::fields(
            "g1",
            "Group one",
            vec![Entry::attribute_text("e1", "Base", "value")],
        ));
        groups
    }
}

struct OverrideProvider;

impl PropertiesProvider for OverrideProvider {
    fn id(&self) -> &str {
        "override"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn contribute(&self, _document: &Document, _node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        if let Some(group) = group_by_id_mut(&mut groups, "g1") {
            group.upsert_entry(Entry::attribute_text("e1", "Overridden", "value"));
        }
        groups
    }
}

#[test]
fn later_provider_overrides_entry_by_id() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut registry = ProviderRegistry::new();
    // Registration order is irrelevant here: the override runs later because
    // its priority number is higher.
    registry.register(Box::new(OverrideProvider));
    registry.register(Box::new(BaseProvider));

    let groups = registry.assemble(&document, &Selection::Single(task));
    assert_eq!(
        shape(&groups),
        vec![("g1".to_string(), vec![("e1".to_string(), "Overridden".to_string())])]
    );
}

#[test]
fn assembly_is_idempotent() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(BaseProvider));
    registry.register(Box::new(OverrideProvider));

    let first = registry.assemble(&document, &Selection::Single(task));
    let second = registry.assemble(&document, &Selection::Single(task));
    assert_eq!(shape(&first), shape(&second));
    let described: Vec<Value> = first.iter().map(|g| g.describe(&document, task)).collect();
    let redescribed: Vec<Value> = second.iter().map(|g| g.describe(&document, task)).collect();
    assert_eq!(described, redescribed);
}

struct EmptyGroupProvider;

impl PropertiesProvider for EmptyGroupProvider {
    fn id(&self) -> &str {
        "empty"
    }

    fn contribute(&self, _document: &Document, _node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        groups.push(Group::fields("hollow", "Hollow", Vec::new()));
        groups
    }
}

#[test]
fn empty_groups_are_never_rendered() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(BaseProvider));
    registry.register(Box::new(EmptyGroupProvider));

    let groups = registry.assemble(&document, &Selection::Single(task));
    assert!(groups.iter().all(|group| group.id != "hollow"));
}

#[test]
fn multi_and_no_selection_yield_nothing() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let event = node(&document, "ErrorEvent_1");
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(BaseProvider));

    assert!(registry.assemble(&document, &Selection::None).is_empty());
    assert!(
        registry
            .assemble(&document, &Selection::Multi(vec![task, event]))
            .is_empty()
    );
}

struct NamedAppender {
    name: &'static str,
}

impl PropertiesProvider for NamedAppender {
    fn id(&self) -> &str {
        self.name
    }

    fn contribute(&self, _document: &Document, _node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        groups.push(Group::fields(
            self.name,
            self.name,
            vec![Entry::attribute_text("value", "Value", "value")],
        ));
        groups
    }
}

#[test]
fn equal_priorities_keep_registration_order() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(NamedAppender { name: "first" }));
    registry.register(Box::new(NamedAppender { name: "second" }));
    registry.register(Box::new(NamedAppender { name: "third" }));

    let groups = registry.assemble(&document, &Selection::Single(task));
    let ids: Vec<&str> = groups.iter().map(|group| group.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

struct GroupDropper;

impl PropertiesProvider for GroupDropper {
    fn id(&self) -> &str {
        "dropper"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn contribute(&self, _document: &Document, _node: NodeId, mut groups: Vec<Group>) -> Vec<Group> {
        remove_group(&mut groups, "g1");
        groups
    }
}

#[test]
fn a_provider_can_filter_out_earlier_groups() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(BaseProvider));
    registry.register(Box::new(GroupDropper));

    let groups = registry.assemble(&document, &Selection::Single(task));
    assert!(groups.is_empty());
}

struct NeverApplies;

impl PropertiesProvider for NeverApplies {
    fn id(&self) -> &str {
        "never"
    }

    fn applies_to(&self, _document: &Document, _node: NodeId) -> bool {
        false
    }

    fn contribute(&self, _document: &Document, _node: NodeId, _groups: Vec<Group>) -> Vec<Group> {
        panic!("contribute must not run when applies_to is false");
    }
}

#[test]
fn capability_predicate_skips_contribute() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut registry = ProviderRegistry::new();
    registry.register(Box::new(BaseProvider));
    registry.register(Box::new(NeverApplies));

    let groups = registry.assemble(&document, &Selection::Single(task));
    assert_eq!(groups.len(), 1);
}

#[test]
fn builtin_vocabulary_classifies_tags() {
    assert_eq!(classify(&TypeTag::from("task")), Some(ElementKind::Task));
    assert_eq!(
        classify(&TypeTag::from("error-event")),
        Some(ElementKind::ErrorEvent)
    );
    assert_eq!(classify(&TypeTag::from("vendor:custom")), None);
}

#[test]
fn builtin_providers_cover_the_general_form() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let registry = builtin::default_registry();

    let groups = registry.assemble(&document, &Selection::Single(task));
    let ids: Vec<&str> = groups.iter().map(|group| group.id.as_str()).collect();
    assert_eq!(ids, vec!["general", "documentation"]);

    let general = &groups[0];
    let name = general.entry("name").expect("name entry");
    assert_eq!(name.get(&document, task), Some(json!("Collect order")));
    let id_entry = general.entry("id").expect("id entry");
    assert_eq!(id_entry.control, Control::ReadOnly);
    assert_eq!(id_entry.get(&document, task), Some(json!("Task_1")));
}

#[test]
fn error_events_get_a_reference_group() {
    let document = fixture();
    let event = node(&document, "ErrorEvent_1");
    let registry = builtin::default_registry();

    let groups = registry.assemble(&document, &Selection::Single(event));
    let error_group = groups
        .iter()
        .find(|group| group.id == "error")
        .expect("error group");
    let entry = error_group.entry("error-ref").expect("reference entry");
    let Control::Select { options } = &entry.control else {
        panic!("reference entry renders as a select");
    };
    let values: Vec<&str> = options.iter().map(|option| option.value.as_str()).collect();
    assert_eq!(values, vec!["", "create-new", "Error_1"]);
}

#[test]
fn extension_list_add_and_remove_manage_the_wrapper() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut context = EditingContext::new(document).with_registry(builtin::default_registry());
    let pristine = {
        let document = context.document();
        document.structure(document.root())
    };

    // No items yet, so the list group is suppressed.
    let groups = context.assemble(&Selection::Single(task));
    assert!(groups.iter().all(|group| group.id != "extension-properties"));

    // The add handler materializes the wrapper and the first item at once.
    let contributed = builtin::ExtensionPropertiesProvider
        .contribute(context.document(), task, Vec::new())
        .into_iter()
        .next()
        .expect("list group contributed");
    contributed.add_item(&mut context).expect("adds first item");

    let groups = context.assemble(&Selection::Single(task));
    let list = groups
        .iter()
        .find(|group| group.id == "extension-properties")
        .expect("list group present");
    let items = list.items().expect("list group has items");
    assert_eq!(items.len(), 1);

    // Removing the last item prunes the wrapper and restores the shape.
    list.remove_item(&mut context, &items[0])
        .expect("removes item");
    let restored = {
        let document = context.document();
        document.structure(document.root())
    };
    assert_eq!(restored, pristine);
}
