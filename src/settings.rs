//! User settings persisted in the config directory.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use rawcull_core::{DEFAULT_EXCLUDE_PATTERNS, DeletionCode, DeletionPolicy};

/// Companion combination a RAW file can be deleted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionCase {
    /// No XMP and no JPEG next to the RAW file.
    RawOnly,
    /// A JPEG but no XMP.
    RawJpeg,
    /// An XMP but no JPEG.
    RawXmp,
    /// Both an XMP and a JPEG.
    RawXmpJpeg,
}

impl DeletionCase {
    pub fn code(self) -> DeletionCode {
        match self {
            Self::RawOnly => DeletionCode::RAW_ONLY,
            Self::RawJpeg => DeletionCode::RAW_JPEG,
            Self::RawXmp => DeletionCode::RAW_XMP,
            Self::RawXmpJpeg => DeletionCode::RAW_XMP_JPEG,
        }
    }
}

/// Build a policy from the selected cases.
pub fn policy_from_cases(cases: &[DeletionCase]) -> DeletionPolicy {
    cases.iter().map(|c| c.code()).collect()
}

/// Defaults for command-line options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cases deleted when `--when` is not given.
    pub delete_when: Vec<DeletionCase>,
    /// Directory globs left out of the scan.
    pub exclude_patterns: Vec<String>,
    /// Scanner threads (0 = auto-detect).
    pub threads: usize,
    /// Move files to the trash instead of unlinking them.
    pub use_trash: bool,
    /// Where paths that could not be removed are written.
    pub recovery_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delete_when: vec![DeletionCase::RawOnly],
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect(),
            threads: 0,
            use_trash: true,
            recovery_file: PathBuf::from("files-to-delete.txt"),
        }
    }
}

impl Settings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rawcull").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }

    /// Parse settings, falling back to defaults on malformed input.
    pub fn parse(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed settings file");
                Self::default()
            }
        }
    }
}
