//! Directory scanning engine for rawcull.
//!
//! This crate walks a directory tree in parallel using jwalk and produces
//! one [`DirectoryGroup`] per directory that directly contains RAW, JPEG or
//! XMP files.
//!
//! # Overview
//!
//! - **Parallel traversal** via jwalk/rayon, with file stats done on the
//!   worker threads
//! - **Exclusion before descent**: `*.lrdata` preview caches (or any custom
//!   predicate) are never read
//! - **Best effort**: unreadable directories and files become warnings
//! - **Progress updates** via broadcast channels
//! - **Cooperative cancellation** via a [`CancellationToken`]
//!
//! # Example
//!
//! ```rust,no_run
//! use rawcull_scan::{DirectoryScanner, ScanConfig};
//!
//! let config = ScanConfig::new("/path/to/photos");
//! let scanner = DirectoryScanner::new();
//! let report = scanner.scan(&config).unwrap();
//!
//! println!("{} directories with photos", report.groups.len());
//! for dir in report.skipped_directories() {
//!     println!("skipped {}", dir.display());
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use rawcull_scan::{DirectoryScanner, ScanConfig};
//!
//! let scanner = DirectoryScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! tokio::spawn(async move {
//!     while let Ok(progress) = progress_rx.recv().await {
//!         println!(
//!             "Searching {} ({} remaining)",
//!             progress.current_directory.display(),
//!             progress.directories_remaining
//!         );
//!     }
//! });
//! ```

mod progress;
mod scanner;

pub use progress::ScanProgress;
pub use scanner::{DirectoryScanner, ExcludeFn};
pub use tokio_util::sync::CancellationToken;

// Re-export core types for convenience
pub use rawcull_core::{
    CandidateFile, DirectoryGroup, ScanConfig, ScanError, ScanReport, ScanStats, ScanWarning,
    WarningKind,
};
