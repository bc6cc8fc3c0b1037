use indexmap::IndexMap;
use serde_json::{Value, json};

use propsheet::io::decode_document;
use propsheet::materialize::{ensure_container, prune_if_empty};
use propsheet::{Command, Document, EditingContext, NodeId, TypeTag};

fn fixture() -> Document {
    decode_document(&json!({
        "kind": "process",
        "id": "Process_1",
        "children": [
            {"kind": "task", "id": "Task_1", "attributes": {"name": "Collect order"}}
        ]
    }))
    .expect("fixture document")
}

fn node(document: &Document, id: &str) -> NodeId {
    document.lookup(id).expect("node exists")
}

fn snapshot(context: &EditingContext) -> Value {
    let document = context.document();
    document.structure(document.root())
}

fn new_wrapper(document: &mut Document) -> Result<NodeId, propsheet::ModelError> {
    let id = document.fresh_id("Extensions");
    document.create_node(TypeTag::from("extensions"), id, IndexMap::new())
}

#[test]
fn ensure_container_returns_existing_without_commands() {
    let document = decode_document(&json!({
        "kind": "process",
        "id": "Process_1",
        "children": [
            {"kind": "task", "id": "Task_1", "children": [
                {"kind": "extensions", "id": "Extensions_1"}
            ]}
        ]
    }))
    .expect("fixture document");
    let task = node(&document, "Task_1");
    let existing = node(&document, "Extensions_1");
    let mut context = EditingContext::new(document);

    let (container, commands) =
        ensure_container(context.document_mut(), task, &TypeTag::from("extensions"), new_wrapper)
            .expect("resolves");
    assert_eq!(container, existing);
    assert!(commands.is_empty());
}

#[test]
fn container_and_first_child_are_one_undo_step() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut context = EditingContext::new(document);
    let before = snapshot(&context);

    let kind = TypeTag::from("extensions");
    let (container, mut commands) =
        ensure_container(context.document_mut(), task, &kind, new_wrapper).expect("materializes");
    let property = context
        .document_mut()
        .create_node(
            TypeTag::from("property"),
            "Property_1",
            IndexMap::from([("name".to_string(), json!("retries"))]),
        )
        .expect("allocates");
    commands.push(Command::attach(container, property));
    context
        .execute(Command::batched(commands).expect("valid batch"))
        .expect("executes");

    assert!(context.document().is_attached(container));
    assert!(context.document().is_attached(property));

    // One undo removes the wrapper together with its first child.
    context.undo().expect("undo applies");
    assert_eq!(snapshot(&context), before);
    assert!(!context.document().is_attached(container));
}

#[test]
fn prune_only_fires_when_batch_empties_the_container() {
    let document = decode_document(&json!({
        "kind": "process",
        "id": "Process_1",
        "children": [
            {"kind": "task", "id": "Task_1", "children": [
                {"kind": "extensions", "id": "Extensions_1", "children": [
                    {"kind": "property", "id": "Property_1"},
                    {"kind": "property", "id": "Property_2"}
                ]}
            ]}
        ]
    }))
    .expect("fixture document");
    let wrapper = node(&document, "Extensions_1");
    let first = node(&document, "Property_1");
    let second = node(&document, "Property_2");

    assert!(prune_if_empty(&document, wrapper, &[first]).is_none());
    assert!(prune_if_empty(&document, wrapper, &[first, second]).is_some());
}

#[test]
fn write_then_remove_restores_the_pre_write_shape() {
    let document = fixture();
    let task = node(&document, "Task_1");
    let mut context = EditingContext::new(document);
    let pristine = snapshot(&context);

    // Materialize wrapper + child.
    let kind = TypeTag::from("extensions");
    let (container, mut commands) =
        ensure_container(context.document_mut(), task, &kind, new_wrapper).expect("materializes");
    let property = context
        .document_mut()
        .create_node(TypeTag::from("property"), "Property_1", IndexMap::new())
        .expect("allocates");
    commands.push(Command::attach(container, property));
    context
        .execute(Command::batched(commands).expect("valid batch"))
        .expect("executes");

    // Remove the sole child, pruning the now-empty wrapper in the same batch.
    let mut removal = vec![Command::detach(property)];
    removal.extend(prune_if_empty(context.document(), container, &[property]));
    context
        .execute(Command::batched(removal).expect("valid batch"))
        .expect("executes");

    assert_eq!(snapshot(&context), pristine);

    // And the removal itself undoes as a single unit.
    context.undo().expect("undo applies");
    assert!(context.document().is_attached(container));
    assert!(context.document().is_attached(property));
}
