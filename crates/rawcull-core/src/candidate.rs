//! Files discovered by the scanner and their per-directory grouping.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::kind::{ExtensionClass, base_key, classify};

/// A relevant file found during a scan.
///
/// `path` keeps the original spelling and is the only field used for I/O;
/// `base_key` is the normalized form used for companion matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    /// Full path as found on disk.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Directory containing the file.
    pub directory: PathBuf,
    /// Lower-cased file stem.
    pub base_key: CompactString,
    /// Extension class.
    pub class: ExtensionClass,
}

impl CandidateFile {
    /// Create a candidate, deriving directory, key and class from the path.
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            base_key: base_key(&path),
            class: classify(&path),
            directory,
            path,
            size,
        }
    }

    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// All relevant files found directly inside one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryGroup {
    /// The directory.
    pub directory: PathBuf,
    /// Files in discovery order.
    pub files: Vec<CandidateFile>,
}

impl DirectoryGroup {
    /// Create an empty group.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            files: Vec::new(),
        }
    }

    /// Build a group from files. Irrelevant files are dropped.
    pub fn with_files(directory: impl Into<PathBuf>, files: Vec<CandidateFile>) -> Self {
        Self {
            directory: directory.into(),
            files: files.into_iter().filter(|f| f.class.is_relevant()).collect(),
        }
    }

    /// Add a file. Returns `false` (and ignores it) if it is irrelevant.
    pub fn push(&mut self, file: CandidateFile) -> bool {
        if !file.class.is_relevant() {
            return false;
        }
        self.files.push(file);
        true
    }

    /// Files of one class, in discovery order.
    pub fn files_of(&self, class: ExtensionClass) -> impl Iterator<Item = &CandidateFile> {
        self.files.iter().filter(move |f| f.class == class)
    }

    /// Number of files of one class.
    pub fn count(&self, class: ExtensionClass) -> u64 {
        self.files_of(class).count() as u64
    }

    /// Total size of all files in the group.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}
