//! JWalk-based parallel directory scanner.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use jwalk::{Parallelism, WalkDirGeneric};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use rawcull_core::{
    CandidateFile, DirectoryGroup, ScanConfig, ScanError, ScanReport, ScanStats, ScanWarning,
    classify,
};

use crate::progress::{ProgressTracker, ScanProgress};

/// Predicate deciding whether a directory is left out of the walk.
pub type ExcludeFn = dyn Fn(&Path) -> bool + Send + Sync;

/// Per-entry state filled in on the worker threads.
#[derive(Debug, Clone, Default)]
struct EntryState {
    size: u64,
    stat_error: Option<String>,
    excluded: bool,
}

type Walker = WalkDirGeneric<((), EntryState)>;

/// Parallel scanner grouping RAW, JPEG and XMP files per directory.
///
/// Directory listings and file stats run on a rayon pool through jwalk.
/// Excluded subtrees are pruned before they are read, unreadable directories
/// and files become [`ScanWarning`]s, and only the root is required to be
/// valid.
pub struct DirectoryScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
    exclude: Option<Arc<ExcludeFn>>,
    cancel: CancellationToken,
}

impl DirectoryScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            exclude: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the config's exclude patterns with a custom predicate.
    pub fn with_exclusion<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.exclude = Some(Arc::new(predicate));
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the scan when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Subscribe to scan progress updates.
    ///
    /// One update is broadcast per directory listing. Slow receivers miss
    /// updates instead of slowing the scan down.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Scan the configured root.
    ///
    /// Fails only if the root is missing, not a directory, or cannot be
    /// listed, or if the config is invalid. Everything below the root is
    /// best effort.
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let root = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;

        if !root.is_dir() {
            return Err(ScanError::NotADirectory { path: root });
        }
        std::fs::read_dir(&root).map_err(|e| ScanError::io(&root, e))?;

        let exclude = match &self.exclude {
            Some(predicate) => Arc::clone(predicate),
            None => {
                let exclusion = config.exclusion()?;
                Arc::new(move |path: &Path| exclusion.is_excluded(path)) as Arc<ExcludeFn>
            }
        };

        let tracker = Arc::new(ProgressTracker::new());
        let walker = self.walker(config, &root, exclude, Arc::clone(&tracker));

        let mut groups: IndexMap<PathBuf, DirectoryGroup> = IndexMap::new();
        let mut warnings = Vec::new();
        let mut unreadable: HashSet<PathBuf> = HashSet::new();
        let mut stats = ScanStats::new();
        let mut cancelled = false;

        for entry_result in walker {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    if unreadable.insert(path.clone()) {
                        tracker.record_failure();
                        warn!(path = %path.display(), error = %err, "Skipping unreadable directory");
                        warnings.push(ScanWarning::directory_unreadable(path, &err));
                    }
                    continue;
                }
            };

            let path = entry.path();

            if entry.file_type.is_dir() {
                if entry.client_state.excluded {
                    stats.directories_excluded += 1;
                    debug!(path = %path.display(), "Excluded directory not descended");
                }
                if let Some(err) = &entry.read_children_error {
                    if unreadable.insert(path.clone()) {
                        tracker.record_failure();
                        warn!(path = %path.display(), error = %err, "Skipping unreadable directory");
                        warnings.push(ScanWarning::directory_unreadable(&path, err));
                    }
                }
                continue;
            }

            if let Some(message) = &entry.client_state.stat_error {
                warn!(path = %path.display(), error = %message, "Skipping unreadable file");
                warnings.push(ScanWarning::stat_failed(&path, message));
                continue;
            }

            let file = CandidateFile::new(path, entry.client_state.size);
            stats.record_file(file.size);
            groups
                .entry(file.directory.clone())
                .or_insert_with(|| DirectoryGroup::new(file.directory.clone()))
                .push(file);
        }

        cancelled |= self.cancel.is_cancelled();
        stats.directories_scanned = tracker
            .directories_finished()
            .saturating_sub(unreadable.len() as u64);

        Ok(ScanReport {
            root,
            groups: groups.into_values().filter(|g| !g.is_empty()).collect(),
            warnings,
            stats,
            duration: start.elapsed(),
            cancelled,
        })
    }

    /// Build the jwalk walker.
    ///
    /// The per-directory callback runs on the rayon pool: it prunes excluded
    /// or (after cancellation) all subdirectories, drops irrelevant entries,
    /// and stats the remaining files so their sizes arrive with the entry.
    fn walker(
        &self,
        config: &ScanConfig,
        root: &Path,
        exclude: Arc<ExcludeFn>,
        tracker: Arc<ProgressTracker>,
    ) -> Walker {
        let parallelism = match config.threads {
            0 => Parallelism::RayonDefaultPool {
                busy_timeout: Duration::from_millis(100),
            },
            n => Parallelism::RayonNewPool(n),
        };

        let progress_tx = self.progress_tx.clone();
        let cancel = self.cancel.clone();

        Walker::new(root)
            .parallelism(parallelism)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks)
            .sort(true)
            .process_read_dir(move |depth, dir_path, _state, children| {
                // No depth: this is the synthetic listing holding the root itself
                if depth.is_none() {
                    return;
                }

                let stop = cancel.is_cancelled();
                let mut subdirectories = 0;
                let mut files = 0;

                children.retain_mut(|result| {
                    let Ok(entry) = result else {
                        return true;
                    };

                    if entry.file_type.is_dir() {
                        if exclude(&entry.path()) {
                            entry.read_children_path = None;
                            entry.client_state.excluded = true;
                        } else if stop {
                            entry.read_children_path = None;
                        } else {
                            subdirectories += 1;
                        }
                        return true;
                    }

                    let is_link = entry.file_type.is_symlink();
                    if !entry.file_type.is_file() && !is_link {
                        return false;
                    }
                    if !classify(Path::new(&entry.file_name)).is_relevant() {
                        return false;
                    }

                    // A linked companion counts like the file it points to
                    let metadata = if is_link {
                        std::fs::metadata(entry.path()).map_err(|e| e.to_string())
                    } else {
                        entry.metadata().map_err(|e| e.to_string())
                    };
                    match metadata {
                        Ok(metadata) if metadata.is_file() => {
                            entry.client_state.size = metadata.len()
                        }
                        Ok(_) => return false,
                        Err(message) => entry.client_state.stat_error = Some(message),
                    }
                    files += 1;
                    true
                });

                tracker.record_listing(subdirectories, files);
                let _ = progress_tx.send(tracker.snapshot(dir_path));
            })
    }
}

impl Default for DirectoryScanner {
    fn default() -> Self {
        Self::new()
    }
}
