//! The deletion plan produced by classification.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateFile;

/// One RAW file marked for deletion, with its XMP sidecar if one was matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// The RAW file.
    pub raw: CandidateFile,
    /// The matched sidecar.
    pub xmp: Option<CandidateFile>,
}

impl PlanEntry {
    /// Bytes reclaimed by removing this entry.
    pub fn bytes(&self) -> u64 {
        self.raw.size + self.xmp.as_ref().map_or(0, |x| x.size)
    }

    /// Files of this entry, RAW first.
    pub fn files(&self) -> impl Iterator<Item = &CandidateFile> {
        std::iter::once(&self.raw).chain(self.xmp.as_ref())
    }
}

/// Per-directory counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStats {
    /// The directory.
    pub directory: PathBuf,
    /// RAW files found.
    pub raw_found: u64,
    /// RAW files marked for deletion.
    pub raw_marked: u64,
    /// XMP files found.
    pub xmp_found: u64,
    /// XMP files marked for deletion.
    pub xmp_marked: u64,
    /// JPEG files found (`.jpg` and `.jpeg` together).
    pub jpeg_found: u64,
}

impl DirectoryStats {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    /// Add another row's counts into this one. The directory is left as is.
    pub fn merge(&mut self, other: &DirectoryStats) {
        self.raw_found += other.raw_found;
        self.raw_marked += other.raw_marked;
        self.xmp_found += other.xmp_found;
        self.xmp_marked += other.xmp_marked;
        self.jpeg_found += other.jpeg_found;
    }

    /// Whether anything in this directory was marked.
    pub fn has_marked(&self) -> bool {
        self.raw_marked > 0 || self.xmp_marked > 0
    }
}

/// Classification result of a single directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    /// Marked entries, in the group's file order.
    pub entries: Vec<PlanEntry>,
    /// Counts for the directory.
    pub stats: DirectoryStats,
    /// Bytes reclaimed by the entries.
    pub bytes: u64,
}

/// Files to delete plus aggregate statistics.
///
/// Built by merging [`GroupPlan`]s in order. Once built it is only read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionPlan {
    /// Marked entries in the order they were added.
    pub entries: Vec<PlanEntry>,
    /// One row per classified directory.
    pub directories: Vec<DirectoryStats>,
    /// Total bytes reclaimed.
    pub total_bytes: u64,
}

impl DeletionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one directory's result.
    pub fn push_group(&mut self, group: GroupPlan) {
        self.total_bytes += group.bytes;
        self.entries.extend(group.entries);
        self.directories.push(group.stats);
    }

    /// All paths to remove, RAW then XMP per entry.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .flat_map(PlanEntry::files)
            .map(|f| f.path.clone())
            .collect()
    }

    /// Paths with their sizes, in the same order as [`paths`](Self::paths).
    pub fn targets(&self) -> Vec<(PathBuf, u64)> {
        self.entries
            .iter()
            .flat_map(PlanEntry::files)
            .map(|f| (f.path.clone(), f.size))
            .collect()
    }

    /// Number of files to remove.
    pub fn file_count(&self) -> usize {
        self.entries.iter().map(|e| 1 + usize::from(e.xmp.is_some())).sum()
    }

    /// Sum of all directory rows.
    pub fn totals(&self) -> DirectoryStats {
        let mut totals = DirectoryStats::default();
        for row in &self.directories {
            totals.merge(row);
        }
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
