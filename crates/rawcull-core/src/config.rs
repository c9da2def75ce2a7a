//! Scan configuration types.

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Default patterns for subtrees that are never descended into.
///
/// Lightroom keeps its preview caches in `*.lrdata` directories.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.lrdata"];

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root directory to scan.
    pub root: PathBuf,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files and directories (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Number of threads for scanning (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Glob patterns for directories that are not descended into, matched
    /// against the full directory path.
    #[builder(default = "default_exclude_patterns()")]
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_exclude_patterns() -> Vec<String> {
    DEFAULT_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(ref patterns) = self.exclude_patterns {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| format!("Invalid exclude pattern {pattern:?}: {e}"))?;
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
            include_hidden: true,
            threads: 0,
            exclude_patterns: default_exclude_patterns(),
        }
    }

    /// Compile the exclude patterns.
    pub fn exclusion(&self) -> Result<Exclusion, ScanError> {
        Exclusion::from_patterns(&self.exclude_patterns)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Compiled directory exclusion predicate.
#[derive(Debug, Clone)]
pub struct Exclusion {
    set: GlobSet,
}

impl Exclusion {
    /// Exclusion that matches nothing.
    pub fn none() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }

    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ScanError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
                message: format!("Invalid exclude pattern {pattern:?}: {e}"),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })?;
        Ok(Self { set })
    }

    /// Check whether a directory must not be descended into.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.set.is_match(path)
    }
}

impl Default for Exclusion {
    fn default() -> Self {
        // The default patterns are known to compile
        Self::from_patterns(DEFAULT_EXCLUDE_PATTERNS).unwrap_or_else(|_| Self::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .root("/photos")
            .threads(4usize)
            .follow_symlinks(true)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/photos"));
        assert_eq!(config.threads, 4);
        assert!(config.follow_symlinks);
        assert_eq!(config.exclude_patterns, vec!["*.lrdata".to_string()]);
    }

    #[test]
    fn test_config_builder_requires_root() {
        assert!(ScanConfig::builder().build().is_err());
        assert!(ScanConfig::builder().root("").build().is_err());
    }

    #[test]
    fn test_config_builder_rejects_bad_glob() {
        let result = ScanConfig::builder()
            .root("/photos")
            .exclude_patterns(vec!["[unclosed".to_string()])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_default_exclusion() {
        let exclusion = ScanConfig::new("/photos").exclusion().unwrap();
        assert!(exclusion.is_excluded(Path::new("/photos/Catalog Previews.lrdata")));
        assert!(exclusion.is_excluded(Path::new("/photos/2020/Smart Previews.lrdata")));
        assert!(!exclusion.is_excluded(Path::new("/photos/2020")));
        assert!(!exclusion.is_excluded(Path::new("/photos/lrdata.backup")));
    }

    #[test]
    fn test_custom_exclusion() {
        let exclusion = Exclusion::from_patterns(&["**/.trash", "*.lrdata"]).unwrap();
        assert!(exclusion.is_excluded(Path::new("/photos/.trash")));
        assert!(!Exclusion::none().is_excluded(Path::new("/photos/x.lrdata")));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"root": "/photos"}"#).unwrap();
        assert!(config.include_hidden);
        assert_eq!(config.exclude_patterns, vec!["*.lrdata".to_string()]);
    }
}
