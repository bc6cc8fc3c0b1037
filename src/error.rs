use thiserror::Error;

/// Errors raised by the document model and the command layer.
///
/// Structural errors (`CommandDefinition`, `StaleTarget`) abort the offending
/// operation without corrupting committed state; `UnknownReference` is
/// recoverable and callers degrade to "no reference"; `DetachedNode` signals
/// a broken parent chain and is never expected in correct operation.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("malformed command: {0}")]
    CommandDefinition(String),

    #[error("command target `{id}` is not attached to the document")]
    StaleTarget { id: String },

    #[error("reference `{id}` does not resolve to a known global object")]
    UnknownReference { id: String },

    #[error("node `{id}` has a corrupted parent chain")]
    DetachedNode { id: String },

    #[error("id `{id}` is already claimed by another node")]
    DuplicateId { id: String },

    #[error("node ids must not be empty")]
    EmptyId,
}
