//! Recovery list of files that could not be removed.
//!
//! Plain text, one absolute path per line, no header.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors reading or writing a recovery list.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("Failed to write recovery list {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read recovery list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render paths in recovery list format.
///
/// On unix the path bytes are written as they are. Elsewhere non-UTF-8
/// paths are converted lossily.
pub fn format_recovery_list(paths: &[PathBuf]) -> Vec<u8> {
    let mut out = Vec::new();
    for path in paths {
        out.extend_from_slice(&path_bytes(path));
        out.push(b'\n');
    }
    out
}

/// Write the recovery list, replacing any existing file.
pub fn write_recovery_list(path: &Path, paths: &[PathBuf]) -> Result<(), RecoveryError> {
    let write_err = |source| RecoveryError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(write_err)?;
    file.write_all(&format_recovery_list(paths))
        .and_then(|()| file.flush())
        .map_err(write_err)
}

/// Read a recovery list. Blank lines are ignored.
pub fn read_recovery_list(path: &Path) -> Result<Vec<PathBuf>, RecoveryError> {
    let content = fs::read(path).map_err(|source| RecoveryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .split(|&b| b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .map(path_from_bytes)
        .collect())
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_one_path_per_line() {
        let paths = vec![PathBuf::from("/a/x.cr2"), PathBuf::from("/a/x.xmp")];
        assert_eq!(format_recovery_list(&paths), b"/a/x.cr2\n/a/x.xmp\n");
        assert!(format_recovery_list(&[]).is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let list = temp.path().join("failed.txt");
        let paths = vec![
            PathBuf::from("/photos/with space/IMG_1.CR2"),
            PathBuf::from("/photos/IMG_1.xmp"),
        ];

        write_recovery_list(&list, &paths).unwrap();
        assert_eq!(read_recovery_list(&list).unwrap(), paths);
    }

    #[test]
    fn test_read_skips_blank_lines() {
        let temp = TempDir::new().unwrap();
        let list = temp.path().join("failed.txt");
        fs::write(&list, "\n/a/x.cr2\r\n\n/a/y.cr2\n").unwrap();

        assert_eq!(
            read_recovery_list(&list).unwrap(),
            vec![PathBuf::from("/a/x.cr2"), PathBuf::from("/a/y.cr2")]
        );
    }

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = read_recovery_list(&temp.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, RecoveryError::Read { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_survives() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let list = temp.path().join("failed.txt");
        let odd = PathBuf::from(OsStr::from_bytes(b"/photos/IMG_\xff\xfe.cr2"));

        write_recovery_list(&list, &[odd.clone()]).unwrap();
        assert_eq!(fs::read(&list).unwrap(), b"/photos/IMG_\xff\xfe.cr2\n");
        assert_eq!(read_recovery_list(&list).unwrap(), vec![odd]);
    }
}
