//! Structural errors found while indexing a decoded document.

use thiserror::Error;

/// A document is well-formed JSON but structurally unusable.
///
/// These are reported before any evaluation starts, so a malformed graph
/// never produces partial effects.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),

    #[error("duplicate block label `{0}`")]
    DuplicateBlock(String),

    #[error("entry block `{0}` does not exist")]
    MissingEntry(String),

    #[error("block `{from}` targets unknown label `{to}`")]
    UnknownLabel { from: String, to: String },
}
