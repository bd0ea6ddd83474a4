//! Error types.

use crate::id::ControlId;
use thiserror::Error;

/// Errors raised by designer operations and undo commands.
///
/// Unknown ids indicate a corrupted state model and are never defaulted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unknown control {0}")]
    UnknownControl(ControlId),

    #[error("control {0} already exists")]
    DuplicateControl(ControlId),

    #[error("control index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid layout document: {0}")]
    Document(#[from] DocumentError),
}

/// Errors raised while loading or upgrading a persisted layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("malformed JSON: {0}")]
    Json(String),

    #[error("unsupported layout version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u64, supported: u64 },

    #[error("unexpected document shape: {0}")]
    InvalidShape(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        DocumentError::Json(e.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
