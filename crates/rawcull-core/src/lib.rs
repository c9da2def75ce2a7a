//! Core types for rawcull.
//!
//! This crate provides the data model shared by the scanner, the
//! classification engine and the deletion executor: extension
//! classification of paths, candidate files grouped per directory,
//! the companion-based deletion policy, and the resulting deletion plan.

mod candidate;
mod config;
mod error;
mod kind;
mod plan;
mod policy;
mod report;

pub use candidate::{CandidateFile, DirectoryGroup};
pub use config::{DEFAULT_EXCLUDE_PATTERNS, Exclusion, ScanConfig, ScanConfigBuilder};
pub use error::{PolicyError, ScanError, ScanWarning, WarningKind};
pub use kind::{
    ExtensionClass, JPEG_ALT_EXTENSION, JPEG_EXTENSION, RAW_EXTENSION, XMP_EXTENSION, base_key,
    classify, sibling_path,
};
pub use plan::{DeletionPlan, DirectoryStats, GroupPlan, PlanEntry};
pub use policy::{CompanionPresence, DeletionCode, DeletionPolicy};
pub use report::{ScanReport, ScanStats};
