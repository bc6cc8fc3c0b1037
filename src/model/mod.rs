mod document;
mod node;

pub use document::Document;
pub use node::{Node, NodeId, TypeTag};
