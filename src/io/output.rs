use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::model::Document;

use super::DocumentFormat;

/// Destination for serialized documents.
#[derive(Debug, Clone)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }
}

/// Controls how a document is serialized and where it is written.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Serialize the whole document tree. Round-trips through
/// [`parse_document_str`](super::parse_document_str) preserve node kinds,
/// ids and attribute values exactly.
pub fn serialize_document(
    document: &Document,
    format: DocumentFormat,
    pretty: bool,
) -> Result<String> {
    let value = document.structure(document.root());
    let out = match format {
        DocumentFormat::Json => {
            if pretty {
                serde_json::to_string_pretty(&value).context("failed to serialize document")?
            } else {
                serde_json::to_string(&value).context("failed to serialize document")?
            }
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::to_string(&value).context("failed to serialize document")?
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            if pretty {
                toml::to_string_pretty(&value).context("failed to serialize document")?
            } else {
                toml::to_string(&value).context("failed to serialize document")?
            }
        }
    };
    Ok(out)
}

/// Write the document to every configured destination.
pub fn write_document(document: &Document, options: &OutputOptions) -> Result<()> {
    let payload = serialize_document(document, options.format, options.pretty)?;
    for destination in &options.destinations {
        match destination {
            OutputDestination::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(payload.as_bytes())
                    .context("failed to write document to stdout")?;
                stdout.write_all(b"\n").context("failed to flush document")?;
            }
            OutputDestination::File(path) => {
                debug!(path = %path.display(), "writing document");
                fs::write(path, &payload)
                    .with_context(|| format!("failed to write document to {}", path.display()))?;
            }
        }
    }
    Ok(())
}
