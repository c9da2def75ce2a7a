//! Companion-based classification of RAW files.
//!
//! Each directory group is classified on its own:
//! 1. Index the group's XMP and JPEG files by base key
//! 2. For every RAW file, look up its siblings and encode what exists
//! 3. Ask the policy, and attach the matched XMP to marked entries
//!
//! Groups are independent, so they are classified in parallel and the
//! results merged in input order. The plan is the same on every run for
//! the same groups and policy.

use std::collections::{HashMap, HashSet};

use compact_str::CompactString;
use derive_builder::Builder;
use rayon::prelude::*;
use tracing::{debug, info};

use rawcull_core::{
    CandidateFile, CompanionPresence, DeletionPlan, DeletionPolicy, DirectoryGroup,
    DirectoryStats, ExtensionClass, GroupPlan, JPEG_ALT_EXTENSION, JPEG_EXTENSION, PlanEntry,
    ScanReport, XMP_EXTENSION, base_key, sibling_path,
};

/// Configuration for classification.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ClassifyConfig {
    /// Which companion combinations mark a RAW file for deletion.
    #[builder(default)]
    pub policy: DeletionPolicy,

    /// Classify directory groups on the rayon pool.
    #[builder(default = "true")]
    pub parallel: bool,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            policy: DeletionPolicy::default(),
            parallel: true,
        }
    }
}

impl ClassifyConfig {
    /// Create a new config builder.
    pub fn builder() -> ClassifyConfigBuilder {
        ClassifyConfigBuilder::default()
    }
}

/// Turns scanned directory groups into a [`DeletionPlan`].
pub struct ClassificationEngine {
    config: ClassifyConfig,
}

impl ClassificationEngine {
    /// Create an engine for a policy.
    pub fn new(policy: DeletionPolicy) -> Self {
        Self {
            config: ClassifyConfig {
                policy,
                ..Default::default()
            },
        }
    }

    /// Create an engine with custom config.
    pub fn with_config(config: ClassifyConfig) -> Self {
        Self { config }
    }

    pub fn policy(&self) -> &DeletionPolicy {
        &self.config.policy
    }

    /// Classify all groups of a scan.
    pub fn classify_report(&self, report: &ScanReport) -> DeletionPlan {
        self.classify(&report.groups)
    }

    /// Classify groups and merge the results in order.
    pub fn classify(&self, groups: &[DirectoryGroup]) -> DeletionPlan {
        let results: Vec<GroupPlan> = if self.config.parallel {
            groups.par_iter().map(|g| self.classify_group(g)).collect()
        } else {
            groups.iter().map(|g| self.classify_group(g)).collect()
        };

        let mut plan = DeletionPlan::new();
        for result in results {
            plan.push_group(result);
        }

        let totals = plan.totals();
        info!(
            directories = plan.directories.len(),
            raw_marked = totals.raw_marked,
            xmp_marked = totals.xmp_marked,
            bytes = plan.total_bytes,
            "Classification complete"
        );

        plan
    }

    /// Classify a single directory.
    ///
    /// Only files inside `group` are considered as companions.
    pub fn classify_group(&self, group: &DirectoryGroup) -> GroupPlan {
        let companions = Companions::index(group);
        let mut stats = DirectoryStats::new(&group.directory);
        stats.raw_found = group.count(ExtensionClass::Raw);
        stats.xmp_found = group.count(ExtensionClass::Xmp);
        stats.jpeg_found = group.count(ExtensionClass::Jpeg);

        let mut entries = Vec::new();
        let mut bytes = 0;
        let mut claimed_xmp: HashSet<CompactString> = HashSet::new();

        for raw in group.files_of(ExtensionClass::Raw) {
            let xmp = companions.xmp_for(raw);
            let presence = CompanionPresence::new(xmp.is_some(), companions.has_jpeg_for(raw));

            if !self.config.policy.decide(presence) {
                continue;
            }

            // Two RAW files differing only in case share one sidecar
            let xmp = xmp.filter(|x| claimed_xmp.insert(x.base_key.clone())).cloned();

            let entry = PlanEntry {
                raw: raw.clone(),
                xmp,
            };
            debug!(path = %raw.path.display(), code = %presence.code(), "Marked for deletion");

            stats.raw_marked += 1;
            stats.xmp_marked += u64::from(entry.xmp.is_some());
            bytes += entry.bytes();
            entries.push(entry);
        }

        GroupPlan {
            entries,
            stats,
            bytes,
        }
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::with_config(ClassifyConfig::default())
    }
}

/// XMP and JPEG files of one group, keyed for sibling lookup.
struct Companions<'a> {
    xmp: HashMap<&'a str, &'a CandidateFile>,
    jpeg: HashSet<&'a str>,
}

impl<'a> Companions<'a> {
    fn index(group: &'a DirectoryGroup) -> Self {
        let mut xmp = HashMap::new();
        let mut jpeg = HashSet::new();
        for file in &group.files {
            match file.class {
                ExtensionClass::Xmp => {
                    xmp.entry(file.base_key.as_str()).or_insert(file);
                }
                ExtensionClass::Jpeg => {
                    jpeg.insert(file.base_key.as_str());
                }
                _ => {}
            }
        }
        Self { xmp, jpeg }
    }

    fn xmp_for(&self, raw: &CandidateFile) -> Option<&'a CandidateFile> {
        let key = base_key(&sibling_path(&raw.path, XMP_EXTENSION));
        self.xmp.get(key.as_str()).copied()
    }

    fn has_jpeg_for(&self, raw: &CandidateFile) -> bool {
        [JPEG_EXTENSION, JPEG_ALT_EXTENSION]
            .iter()
            .any(|ext| self.jpeg.contains(base_key(&sibling_path(&raw.path, ext)).as_str()))
    }
}
