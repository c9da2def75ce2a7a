//! Deletion modes and per-file errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;

/// How files are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum DeletionMode {
    /// Move to the platform trash. Recoverable.
    #[default]
    #[strum(to_string = "Trash")]
    Trash,
    /// Unlink. Irreversible.
    #[strum(to_string = "Delete permanently")]
    Permanent,
}

impl DeletionMode {
    /// Past-tense verb for summaries.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Trash => "Trashed",
            Self::Permanent => "Deleted",
        }
    }
}

/// An error that occurred while removing one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    /// The path that could not be removed.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(path: PathBuf, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}
