//! Error and warning types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a scan before traversal begins.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for the root.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Root not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether the root directory itself was unusable.
    pub fn is_invalid_root(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied { .. } | Self::NotFound { .. } | Self::NotADirectory { .. }
        )
    }
}

/// Errors building a deletion policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Code outside `0..=3`.
    #[error("Invalid deletion code {0}, expected 0-3")]
    InvalidCode(u8),
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A directory could not be listed; its subtree was skipped.
    DirectoryUnreadable,
    /// A file could not be stat'ed; it was left out of its group.
    FileStatFailed,
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a directory that could not be listed.
    pub fn directory_unreadable(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: format!("Could not read directory: {error}"),
            kind: WarningKind::DirectoryUnreadable,
        }
    }

    /// Create a warning for a file whose metadata could not be read.
    pub fn stat_failed(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            message: format!("Could not read file: {error}"),
            kind: WarningKind::FileStatFailed,
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}
