//! Extension classification of paths.
//!
//! Everything here is pure: no filesystem access, no failure modes. Extension
//! comparison is always case-insensitive, so `IMG_0001.CR2` and `img_0001.cr2`
//! classify the same way.

use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Extension of camera RAW files.
pub const RAW_EXTENSION: &str = "cr2";
/// Primary JPEG extension.
pub const JPEG_EXTENSION: &str = "jpg";
/// Alternate JPEG extension. Counts as the same companion as [`JPEG_EXTENSION`].
pub const JPEG_ALT_EXTENSION: &str = "jpeg";
/// Extension of XMP sidecar files.
pub const XMP_EXTENSION: &str = "xmp";

/// Category of a file derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ExtensionClass {
    /// Camera RAW file.
    Raw,
    /// JPEG rendition (`.jpg` or `.jpeg`).
    Jpeg,
    /// XMP sidecar.
    Xmp,
    /// Anything else.
    Irrelevant,
}

impl ExtensionClass {
    /// Whether files of this class take part in classification.
    pub fn is_relevant(self) -> bool {
        self != Self::Irrelevant
    }
}

/// Classify a path by its extension.
///
/// Paths without an extension, dot-files such as `.cr2`, and extensions that
/// are not valid UTF-8 are all [`ExtensionClass::Irrelevant`].
pub fn classify(path: &Path) -> ExtensionClass {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return ExtensionClass::Irrelevant;
    };

    match ext.to_ascii_lowercase().as_str() {
        RAW_EXTENSION => ExtensionClass::Raw,
        JPEG_EXTENSION | JPEG_ALT_EXTENSION => ExtensionClass::Jpeg,
        XMP_EXTENSION => ExtensionClass::Xmp,
        _ => ExtensionClass::Irrelevant,
    }
}

/// Matching key of a path: its file stem, lower-cased.
///
/// Only ever compared between files of the same directory, so the directory
/// part is left out. The key is never used for I/O.
pub fn base_key(path: &Path) -> CompactString {
    path.file_stem()
        .map(|stem| CompactString::from(stem.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Path of the sibling with the same directory and stem but another extension.
///
/// `extension` may be given with or without its leading dot.
pub fn sibling_path(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify(Path::new("/photos/IMG_0001.cr2")), ExtensionClass::Raw);
        assert_eq!(classify(Path::new("/photos/IMG_0001.jpg")), ExtensionClass::Jpeg);
        assert_eq!(classify(Path::new("/photos/IMG_0001.jpeg")), ExtensionClass::Jpeg);
        assert_eq!(classify(Path::new("/photos/IMG_0001.xmp")), ExtensionClass::Xmp);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify(Path::new("IMG_0001.CR2")), ExtensionClass::Raw);
        assert_eq!(classify(Path::new("IMG_0001.JpEg")), ExtensionClass::Jpeg);
        assert_eq!(classify(Path::new("IMG_0001.XMP")), ExtensionClass::Xmp);
    }

    #[test]
    fn test_classify_total() {
        for input in ["", ".", "..", "/", "noext", ".cr2", "a.", "a.b.c", "archive.tar.gz", "x.cr2.bak"] {
            assert_eq!(classify(Path::new(input)), ExtensionClass::Irrelevant, "{input:?}");
        }
        assert_eq!(classify(Path::new("a.b.cr2")), ExtensionClass::Raw);
    }

    #[test]
    fn test_base_key() {
        assert_eq!(base_key(Path::new("/a/IMG_1.CR2")), "img_1");
        assert_eq!(base_key(Path::new("/a/img_1.xmp")), "img_1");
        assert_eq!(base_key(Path::new("/a/shot.v2.cr2")), "shot.v2");
        assert_eq!(base_key(Path::new("/")), "");
    }

    #[test]
    fn test_sibling_path() {
        assert_eq!(
            sibling_path(Path::new("/a/IMG_1.CR2"), ".xmp"),
            PathBuf::from("/a/IMG_1.xmp")
        );
        assert_eq!(
            sibling_path(Path::new("/a/shot.v2.cr2"), "jpg"),
            PathBuf::from("/a/shot.v2.jpg")
        );
    }

    #[test]
    fn test_sibling_shares_base_key() {
        let raw = Path::new("/a/IMG_1.CR2");
        for ext in [XMP_EXTENSION, JPEG_EXTENSION, JPEG_ALT_EXTENSION] {
            assert_eq!(base_key(&sibling_path(raw, ext)), base_key(raw));
        }
    }
}
