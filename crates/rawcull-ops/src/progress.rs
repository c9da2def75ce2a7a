//! Progress reporting types for deletions.

use std::path::PathBuf;

use crate::{DeletionMode, OperationError};

/// Progress information for an ongoing deletion.
#[derive(Debug, Clone)]
pub struct OperationProgress {
    /// How files are being removed.
    pub mode: DeletionMode,
    /// Number of files removed.
    pub files_completed: usize,
    /// Total number of files to process.
    pub files_total: usize,
    /// Bytes freed so far.
    pub bytes_processed: u64,
    /// Total bytes to free.
    pub bytes_total: u64,
    /// The file currently being processed.
    pub current_file: Option<PathBuf>,
    /// Errors encountered so far.
    pub errors: Vec<OperationError>,
}

impl OperationProgress {
    /// Create a new progress tracker.
    pub fn new(mode: DeletionMode, files_total: usize, bytes_total: u64) -> Self {
        Self {
            mode,
            files_completed: 0,
            files_total,
            bytes_processed: 0,
            bytes_total,
            current_file: None,
            errors: Vec::new(),
        }
    }

    /// Files attempted so far, successful or not.
    pub fn files_attempted(&self) -> usize {
        self.files_completed + self.errors.len()
    }

    /// Get the progress as a percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f64 {
        if self.files_total > 0 {
            (self.files_attempted() as f64 / self.files_total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Check if the deletion has any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Add an error to the progress.
    pub fn add_error(&mut self, error: OperationError) {
        self.errors.push(error);
    }

    /// Update the current file being processed.
    pub fn set_current_file(&mut self, path: Option<PathBuf>) {
        self.current_file = path;
    }

    /// Increment the completed count and add bytes.
    pub fn complete_file(&mut self, bytes: u64) {
        self.files_completed += 1;
        self.bytes_processed += bytes;
    }

    /// Final result from the current state.
    pub fn finish(self) -> OperationComplete {
        OperationComplete {
            mode: self.mode,
            succeeded: self.files_completed,
            failed: self.errors.len(),
            bytes_freed: self.bytes_processed,
            errors: self.errors,
        }
    }
}

/// Result of a completed deletion.
#[derive(Debug, Clone)]
pub struct OperationComplete {
    /// How files were removed.
    pub mode: DeletionMode,
    /// Number of files removed.
    pub succeeded: usize,
    /// Number of files that could not be removed.
    pub failed: usize,
    /// Bytes freed.
    pub bytes_freed: u64,
    /// One error per failed file.
    pub errors: Vec<OperationError>,
}

impl OperationComplete {
    /// Empty result for a deletion with nothing to do.
    pub fn empty(mode: DeletionMode) -> Self {
        OperationProgress::new(mode, 0, 0).finish()
    }

    /// Check if every file was removed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Paths that could not be removed, in attempt order.
    pub fn failed_paths(&self) -> Vec<PathBuf> {
        self.errors.iter().map(|e| e.path.clone()).collect()
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.failed == 0 {
            format!("{} {} files", self.mode.verb(), self.succeeded)
        } else {
            format!(
                "{} {} files, {} failed",
                self.mode.verb(),
                self.succeeded,
                self.failed
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_accounting() {
        let mut progress = OperationProgress::new(DeletionMode::Permanent, 4, 1000);
        progress.complete_file(500);
        progress.add_error(OperationError::new(PathBuf::from("/x.cr2"), "busy"));
        assert_eq!(progress.files_attempted(), 2);
        assert_eq!(progress.percentage(), 50.0);

        let complete = progress.finish();
        assert_eq!(complete.succeeded, 1);
        assert_eq!(complete.failed, 1);
        assert_eq!(complete.bytes_freed, 500);
        assert_eq!(complete.failed_paths(), vec![PathBuf::from("/x.cr2")]);
        assert_eq!(complete.summary(), "Deleted 1 files, 1 failed");
    }

    #[test]
    fn test_empty_complete() {
        let complete = OperationComplete::empty(DeletionMode::Trash);
        assert!(complete.is_success());
        assert_eq!(complete.summary(), "Trashed 0 files");
    }
}
