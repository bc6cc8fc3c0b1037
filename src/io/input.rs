use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::model::{Document, NodeId, TypeTag};

use super::DocumentFormat;

/// Parse a document from a string in the given format.
pub fn parse_document_str(input: &str, format: DocumentFormat) -> Result<Document> {
    let value: Value = match format {
        DocumentFormat::Json => {
            serde_json::from_str(input).context("failed to parse JSON document")?
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str(input).context("failed to parse YAML document")?
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            let table: toml::Value =
                toml::from_str(input).context("failed to parse TOML document")?;
            serde_json::to_value(table).context("failed to normalize TOML document")?
        }
    };
    decode_document(&value)
}

/// Parse a document file, guessing the format from the extension.
pub fn parse_document_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path);
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read document file {}", path.display()))?;
    debug!(path = %path.display(), %format, "parsing document");
    parse_document_str(&input, format)
}

/// Rebuild the arena and the id registry from a structural snapshot (the
/// shape produced by [`Document::structure`]). Duplicate or empty ids in the
/// payload fail. Loading sits below the command layer — it is not an
/// undoable edit.
pub fn decode_document(value: &Value) -> Result<Document> {
    let (kind, id, attributes) = decode_header(value)?;
    let mut document = Document::new(kind, id)?;
    let root = document.root();
    for (key, attribute) in attributes {
        document.set_attribute(root, &key, Some(attribute), None);
    }
    decode_children(&mut document, root, value)?;
    Ok(document)
}

fn decode_header(value: &Value) -> Result<(TypeTag, String, IndexMap<String, Value>)> {
    let Some(object) = value.as_object() else {
        bail!("document node must be an object");
    };
    let Some(kind) = object.get("kind").and_then(Value::as_str) else {
        bail!("document node is missing its `kind`");
    };
    let Some(id) = object.get("id").and_then(Value::as_str) else {
        bail!("document node is missing its `id`");
    };
    let mut attributes = IndexMap::new();
    if let Some(map) = object.get("attributes").and_then(Value::as_object) {
        for (key, attribute) in map {
            attributes.insert(key.clone(), attribute.clone());
        }
    }
    Ok((TypeTag::from(kind), id.to_string(), attributes))
}

fn decode_children(document: &mut Document, parent: NodeId, value: &Value) -> Result<()> {
    let children = value
        .get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    for child in children {
        let (kind, id, attributes) = decode_header(child)?;
        let node = document
            .create_node(kind, &id, attributes)
            .with_context(|| format!("failed to allocate node `{id}`"))?;
        document
            .attach(parent, node, None)
            .with_context(|| format!("failed to attach node `{id}`"))?;
        decode_children(document, node, child)?;
    }
    Ok(())
}
