//! Async deletion with per-file outcomes.

use std::fs;
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rawcull_core::DeletionPlan;

use crate::progress::{OperationComplete, OperationProgress};
use crate::{DeletionMode, OPERATION_CHANNEL_SIZE, OperationError};

/// Result sent through the channel during a deletion.
#[derive(Debug)]
pub enum DeletionResult {
    /// Progress update.
    Progress(OperationProgress),
    /// The deletion completed.
    Complete(OperationComplete),
}

/// Start removing files in the background.
///
/// Takes (path, size) pairs and returns a receiver for progress updates.
/// Files are removed one at a time in the given order; a failure is recorded
/// and the remaining files are still attempted. The last message is always
/// [`DeletionResult::Complete`].
pub fn start_deletion(
    targets: Vec<(PathBuf, u64)>,
    mode: DeletionMode,
) -> mpsc::Receiver<DeletionResult> {
    let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);

    if targets.is_empty() {
        tokio::spawn(async move {
            let _ = tx
                .send(DeletionResult::Complete(OperationComplete::empty(mode)))
                .await;
        });
        return rx;
    }

    tokio::spawn(async move {
        delete_impl(targets, mode, tx).await;
    });

    rx
}

async fn delete_impl(
    targets: Vec<(PathBuf, u64)>,
    mode: DeletionMode,
    tx: mpsc::Sender<DeletionResult>,
) {
    let bytes_total = targets.iter().map(|(_, size)| size).sum();
    let mut progress = OperationProgress::new(mode, targets.len(), bytes_total);

    for (path, size) in targets {
        progress.set_current_file(Some(path.clone()));
        let _ = tx.send(DeletionResult::Progress(progress.clone())).await;

        // Perform deletion in blocking task to not block the async runtime
        let path_clone = path.clone();
        let result = tokio::task::spawn_blocking(move || remove_file(&path_clone, mode)).await;

        match result {
            Ok(Ok(())) => {
                debug!(path = %path.display(), %mode, "Removed");
                progress.complete_file(size);
            }
            Ok(Err(message)) => {
                warn!(path = %path.display(), error = %message, "Failed to remove");
                progress.add_error(OperationError::new(path, message));
            }
            Err(join_err) => {
                warn!(path = %path.display(), error = %join_err, "Removal task failed");
                progress.add_error(OperationError::new(path, join_err.to_string()));
            }
        }
    }

    progress.set_current_file(None);
    let complete = progress.finish();
    info!(
        succeeded = complete.succeeded,
        failed = complete.failed,
        bytes = complete.bytes_freed,
        "{}",
        complete.summary()
    );
    let _ = tx.send(DeletionResult::Complete(complete)).await;
}

/// Remove a single file.
fn remove_file(path: &Path, mode: DeletionMode) -> Result<(), String> {
    match mode {
        DeletionMode::Trash => trash::delete(path).map_err(|e| e.to_string()),
        DeletionMode::Permanent => fs::remove_file(path).map_err(|e| e.to_string()),
    }
}

/// Runs a deletion to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionExecutor {
    /// How files are removed.
    pub mode: DeletionMode,
}

impl DeletionExecutor {
    /// Create an executor that moves files to the trash.
    pub fn with_trash() -> Self {
        Self {
            mode: DeletionMode::Trash,
        }
    }

    /// Create an executor that unlinks files.
    pub fn permanent() -> Self {
        Self {
            mode: DeletionMode::Permanent,
        }
    }

    /// Remove every file of a plan, RAW before its XMP.
    pub async fn execute(&self, plan: &DeletionPlan) -> OperationComplete {
        self.execute_targets(plan.targets(), |_| {}).await
    }

    /// Remove the given files, reporting each progress update.
    pub async fn execute_targets<F>(
        &self,
        targets: Vec<(PathBuf, u64)>,
        mut on_progress: F,
    ) -> OperationComplete
    where
        F: FnMut(&OperationProgress),
    {
        let mut rx = start_deletion(targets, self.mode);
        while let Some(result) = rx.recv().await {
            match result {
                DeletionResult::Progress(progress) => on_progress(&progress),
                DeletionResult::Complete(complete) => return complete,
            }
        }
        OperationComplete::empty(self.mode)
    }
}
