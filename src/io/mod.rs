mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{decode_document, parse_document_file, parse_document_str};
pub use output::{OutputDestination, OutputOptions, serialize_document, write_document};
