//! Scan results.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::candidate::DirectoryGroup;
use crate::error::{ScanWarning, WarningKind};

/// Summary counters for a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Directories whose listing was read.
    pub directories_scanned: u64,
    /// Directories skipped by the exclusion predicate.
    pub directories_excluded: u64,
    /// Relevant files included in groups.
    pub files_matched: u64,
    /// Total size of the matched files.
    pub bytes_matched: u64,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a matched file.
    pub fn record_file(&mut self, size: u64) {
        self.files_matched += 1;
        self.bytes_matched += size;
    }
}

/// Everything a scan produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Canonical root that was scanned.
    pub root: PathBuf,
    /// Non-empty directory groups, in traversal order.
    pub groups: Vec<DirectoryGroup>,
    /// Non-fatal problems encountered.
    pub warnings: Vec<ScanWarning>,
    /// Counters.
    pub stats: ScanStats,
    /// Wall time of the scan.
    pub duration: Duration,
    /// The scan was cancelled; `groups` is a partial result.
    pub cancelled: bool,
}

impl ScanReport {
    /// Directories whose subtree could not be read.
    pub fn skipped_directories(&self) -> impl Iterator<Item = &Path> {
        self.warnings
            .iter()
            .filter(|w| w.kind == WarningKind::DirectoryUnreadable)
            .map(|w| w.path.as_path())
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Look up the group of a directory.
    pub fn group(&self, directory: &Path) -> Option<&DirectoryGroup> {
        self.groups.iter().find(|g| g.directory == directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_directories() {
        let report = ScanReport {
            root: PathBuf::from("/photos"),
            groups: Vec::new(),
            warnings: vec![
                ScanWarning::directory_unreadable("/photos/locked", "denied"),
                ScanWarning::stat_failed("/photos/a.cr2", "gone"),
            ],
            stats: ScanStats::new(),
            duration: Duration::ZERO,
            cancelled: false,
        };

        let skipped: Vec<_> = report.skipped_directories().collect();
        assert_eq!(skipped, vec![Path::new("/photos/locked")]);
        assert!(report.has_warnings());
    }

    #[test]
    fn test_stats_record_file() {
        let mut stats = ScanStats::new();
        stats.record_file(500);
        stats.record_file(100);
        assert_eq!(stats.files_matched, 2);
        assert_eq!(stats.bytes_matched, 600);
    }
}
