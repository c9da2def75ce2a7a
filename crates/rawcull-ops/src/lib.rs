//! Deletion engine for rawcull.
//!
//! This crate consumes a [`DeletionPlan`](rawcull_core::DeletionPlan) and
//! removes its files either to the trash or permanently, one file at a time,
//! with progress reporting via channels. A file that cannot be removed is
//! reported and skipped; the paths that failed can be written to a recovery
//! list and retried later.

mod executor;
mod operation;
mod progress;
mod recovery;

pub use executor::{DeletionExecutor, DeletionResult, start_deletion};
pub use operation::{DeletionMode, OperationError};
pub use progress::{OperationComplete, OperationProgress};
pub use recovery::{RecoveryError, format_recovery_list, read_recovery_list, write_recovery_list};

/// Default channel buffer size for deletion progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;
