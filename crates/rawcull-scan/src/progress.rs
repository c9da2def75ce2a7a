//! Scan progress reporting.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Directories found so far, including the root.
    pub directories_discovered: u64,
    /// Discovered directories whose listing has not been read yet.
    pub directories_remaining: u64,
    /// Directory that was just read.
    pub current_directory: PathBuf,
    /// Relevant files found so far.
    pub files_matched: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            directories_discovered: 0,
            directories_remaining: 0,
            current_directory: PathBuf::new(),
            files_matched: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Directories already read.
    pub fn directories_done(&self) -> u64 {
        self.directories_discovered.saturating_sub(self.directories_remaining)
    }

    /// Calculate scan rate in directories per second.
    pub fn directories_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.directories_done() as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Progress counters shared between the walker's worker threads.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    discovered: AtomicU64,
    finished: AtomicU64,
    files_matched: AtomicU64,
}

impl ProgressTracker {
    /// The root counts as discovered from the start.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            discovered: AtomicU64::new(1),
            finished: AtomicU64::new(0),
            files_matched: AtomicU64::new(0),
        }
    }

    /// Record one directory listing with what it revealed.
    pub fn record_listing(&self, subdirectories: u64, files: u64) {
        self.discovered.fetch_add(subdirectories, Ordering::Relaxed);
        self.files_matched.fetch_add(files, Ordering::Relaxed);
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a directory that could not be listed.
    pub fn record_failure(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    pub fn directories_finished(&self) -> u64 {
        self.finished.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self, current_directory: &Path) -> ScanProgress {
        let discovered = self.discovered.load(Ordering::Relaxed);
        let finished = self.finished.load(Ordering::Relaxed);
        ScanProgress {
            directories_discovered: discovered,
            directories_remaining: discovered.saturating_sub(finished),
            current_directory: current_directory.to_path_buf(),
            files_matched: self.files_matched.load(Ordering::Relaxed),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
