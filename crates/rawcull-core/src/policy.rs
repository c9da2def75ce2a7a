//! Companion presence, deletion codes and the deletion policy.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Which companions of a RAW file exist in its directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanionPresence {
    /// An XMP sidecar with the same stem exists.
    pub has_xmp: bool,
    /// A `.jpg` or `.jpeg` with the same stem exists.
    pub has_jpeg: bool,
}

impl CompanionPresence {
    pub fn new(has_xmp: bool, has_jpeg: bool) -> Self {
        Self { has_xmp, has_jpeg }
    }

    /// Encode as a deletion code.
    pub fn code(self) -> DeletionCode {
        DeletionCode::from_presence(self)
    }
}

/// Integer encoding of [`CompanionPresence`]: `2 * has_xmp + has_jpeg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DeletionCode(u8);

impl DeletionCode {
    /// RAW file alone.
    pub const RAW_ONLY: Self = Self(0);
    /// RAW and JPEG, no XMP.
    pub const RAW_JPEG: Self = Self(1);
    /// RAW and XMP, no JPEG.
    pub const RAW_XMP: Self = Self(2);
    /// RAW, XMP and JPEG all present.
    pub const RAW_XMP_JPEG: Self = Self(3);

    /// Every code, in ascending order.
    pub const ALL: [Self; 4] = [Self::RAW_ONLY, Self::RAW_JPEG, Self::RAW_XMP, Self::RAW_XMP_JPEG];

    pub fn from_presence(presence: CompanionPresence) -> Self {
        Self(u8::from(presence.has_xmp) * 2 + u8::from(presence.has_jpeg))
    }

    /// Decode back into the presence flags.
    pub fn presence(self) -> CompanionPresence {
        CompanionPresence {
            has_xmp: self.0 & 2 != 0,
            has_jpeg: self.0 & 1 != 0,
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Human-readable description of the companion combination.
    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "RAW only",
            1 => "RAW and JPEG but no XMP",
            2 => "RAW and XMP but no JPEG",
            _ => "RAW, XMP and JPEG files all exist",
        }
    }
}

impl TryFrom<u8> for DeletionCode {
    type Error = PolicyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 3 {
            Ok(Self(value))
        } else {
            Err(PolicyError::InvalidCode(value))
        }
    }
}

impl From<DeletionCode> for u8 {
    fn from(code: DeletionCode) -> Self {
        code.0
    }
}

impl fmt::Display for DeletionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// Set of deletion codes the user opted into.
///
/// A RAW file is deleted iff its code is a member. An empty policy deletes
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeletionPolicy {
    codes: BTreeSet<DeletionCode>,
}

impl DeletionPolicy {
    /// Policy that never deletes.
    pub fn none() -> Self {
        Self {
            codes: BTreeSet::new(),
        }
    }

    pub fn from_codes(codes: impl IntoIterator<Item = DeletionCode>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// Build from raw integers, rejecting anything outside `0..=3`.
    pub fn from_values(values: impl IntoIterator<Item = u8>) -> Result<Self, PolicyError> {
        let codes = values
            .into_iter()
            .map(DeletionCode::try_from)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { codes })
    }

    pub fn allows(&self, code: DeletionCode) -> bool {
        self.codes.contains(&code)
    }

    /// Decide whether a RAW file with these companions is deleted.
    pub fn decide(&self, presence: CompanionPresence) -> bool {
        self.allows(presence.code())
    }

    pub fn insert(&mut self, code: DeletionCode) -> bool {
        self.codes.insert(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = DeletionCode> + '_ {
        self.codes.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for DeletionPolicy {
    fn default() -> Self {
        Self::from_codes([DeletionCode::RAW_ONLY])
    }
}

impl FromIterator<DeletionCode> for DeletionPolicy {
    fn from_iter<I: IntoIterator<Item = DeletionCode>>(iter: I) -> Self {
        Self::from_codes(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_presences() -> [CompanionPresence; 4] {
        [
            CompanionPresence::new(false, false),
            CompanionPresence::new(false, true),
            CompanionPresence::new(true, false),
            CompanionPresence::new(true, true),
        ]
    }

    #[test]
    fn test_code_values() {
        assert_eq!(CompanionPresence::new(false, false).code().value(), 0);
        assert_eq!(CompanionPresence::new(false, true).code().value(), 1);
        assert_eq!(CompanionPresence::new(true, false).code().value(), 2);
        assert_eq!(CompanionPresence::new(true, true).code().value(), 3);
    }

    #[test]
    fn test_code_is_bijective() {
        let codes: BTreeSet<_> = all_presences().iter().map(|p| p.code()).collect();
        assert_eq!(codes.len(), 4);

        for presence in all_presences() {
            assert_eq!(presence.code().presence(), presence);
        }
    }

    #[test]
    fn test_code_try_from() {
        assert_eq!(DeletionCode::try_from(2).unwrap(), DeletionCode::RAW_XMP);
        assert!(matches!(
            DeletionCode::try_from(4),
            Err(PolicyError::InvalidCode(4))
        ));
    }

    #[test]
    fn test_raw_only_policy() {
        let policy = DeletionPolicy::from_codes([DeletionCode::RAW_ONLY]);
        assert!(policy.decide(CompanionPresence::new(false, false)));
        assert!(!policy.decide(CompanionPresence::new(true, false)));
        assert!(!policy.decide(CompanionPresence::new(false, true)));
    }

    #[test]
    fn test_policy_never_marks_full_triple() {
        let policy = DeletionPolicy::from_codes([DeletionCode::RAW_ONLY, DeletionCode::RAW_XMP]);
        assert!(!policy.decide(CompanionPresence::new(true, true)));
        assert!(policy.decide(CompanionPresence::new(true, false)));
    }

    #[test]
    fn test_empty_policy_deletes_nothing() {
        let policy = DeletionPolicy::none();
        assert!(policy.is_empty());
        for presence in all_presences() {
            assert!(!policy.decide(presence));
        }
    }

    #[test]
    fn test_from_values_rejects_out_of_range() {
        assert!(DeletionPolicy::from_values([0, 2]).is_ok());
        assert!(DeletionPolicy::from_values([0, 7]).is_err());
    }

    #[test]
    fn test_policy_serde_as_integers() {
        let policy = DeletionPolicy::from_codes([DeletionCode::RAW_XMP, DeletionCode::RAW_ONLY]);
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, "[0,2]");

        let parsed: DeletionPolicy = serde_json::from_str("[3,1]").unwrap();
        assert!(parsed.allows(DeletionCode::RAW_JPEG));
        assert!(parsed.allows(DeletionCode::RAW_XMP_JPEG));

        assert!(serde_json::from_str::<DeletionPolicy>("[9]").is_err());
    }
}
