//! Classification engine for rawcull.
//!
//! Decides, per directory, which RAW files show no sign of having been
//! reviewed and can be removed. "Reviewed" is inferred only from which
//! companions share the RAW file's name:
//!
//! | Code | Companions present        |
//! |------|---------------------------|
//! | 0    | none (RAW only)           |
//! | 1    | JPEG (`.jpg` or `.jpeg`)  |
//! | 2    | XMP sidecar               |
//! | 3    | XMP sidecar and JPEG      |
//!
//! A RAW file is marked when its code is in the [`DeletionPolicy`]; a
//! matched XMP sidecar is marked with it.
//!
//! ```rust,ignore
//! use rawcull_classify::{ClassificationEngine, DeletionCode, DeletionPolicy};
//! use rawcull_scan::{DirectoryScanner, ScanConfig};
//!
//! let report = DirectoryScanner::new().scan(&ScanConfig::new("/photos")).unwrap();
//!
//! let policy = DeletionPolicy::from_codes([DeletionCode::RAW_ONLY, DeletionCode::RAW_XMP]);
//! let plan = ClassificationEngine::new(policy).classify_report(&report);
//!
//! println!("{} files, {} bytes", plan.file_count(), plan.total_bytes);
//! ```

mod engine;

pub use engine::{ClassificationEngine, ClassifyConfig, ClassifyConfigBuilder};

// Re-export core types
pub use rawcull_core::{
    CompanionPresence, DeletionCode, DeletionPlan, DeletionPolicy, DirectoryGroup, DirectoryStats,
    GroupPlan, PlanEntry,
};
