use serde_json::json;

use propsheet::io::{DocumentFormat, decode_document, parse_document_str, serialize_document};

#[test]
fn parse_then_serialize_preserves_ids_and_attributes() {
    let payload = json!({
        "kind": "process",
        "id": "Process_1",
        "attributes": {"name": "Order handling"},
        "children": [
            {
                "kind": "task",
                "id": "Task_1",
                "attributes": {"name": "Collect order", "retries": 3},
                "children": [
                    {"kind": "documentation", "id": "Documentation_1",
                     "attributes": {"text": "Collects the order."}, "children": []}
                ]
            },
            {"kind": "error", "id": "Error_1", "attributes": {"name": "Timeout"}, "children": []}
        ]
    });

    let document = decode_document(&payload).expect("decodes");
    let serialized =
        serialize_document(&document, DocumentFormat::Json, true).expect("serializes");
    let reparsed = parse_document_str(&serialized, DocumentFormat::Json).expect("reparses");

    assert_eq!(
        reparsed.structure(reparsed.root()),
        document.structure(document.root())
    );

    let task = reparsed.lookup("Task_1").expect("id preserved");
    assert_eq!(reparsed.attribute(task, "retries"), Some(&json!(3)));
    let docs = reparsed.lookup("Documentation_1").expect("id preserved");
    assert_eq!(
        reparsed.attribute(docs, "text"),
        Some(&json!("Collects the order."))
    );
}

#[test]
fn missing_children_and_attributes_are_optional() {
    let document = decode_document(&json!({
        "kind": "process",
        "id": "Process_1",
        "children": [{"kind": "task", "id": "Task_1"}]
    }))
    .expect("decodes");
    let task = document.lookup("Task_1").expect("node exists");
    assert!(document.node(task).attributes().is_empty());
}

#[test]
fn duplicate_ids_fail_to_decode() {
    let result = decode_document(&json!({
        "kind": "process",
        "id": "Process_1",
        "children": [
            {"kind": "task", "id": "Task_1"},
            {"kind": "task", "id": "Task_1"}
        ]
    }));
    assert!(result.is_err());
}

#[test]
fn nodes_without_a_kind_fail_to_decode() {
    let result = decode_document(&json!({
        "id": "Process_1",
        "children": []
    }));
    assert!(result.is_err());
}
