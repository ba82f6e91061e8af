//! File identities for tracking parsed source files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FILE_SCHEME: &str = "file://";

/// A URI identifying a source file.
///
/// `FileUri` is a cheap, reference-counted handle around the URI text.
/// Symbol tables, include records and locations all key on it, so cloning
/// must stay O(1).
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileUri(Arc<str>);

impl FileUri {
    /// Wrap a URI string as-is.
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        Self(uri.into())
    }

    /// Build a `file://` URI from a filesystem path.
    ///
    /// Backslashes are normalized so Windows paths compare equal to
    /// the URIs the host sends.
    pub fn from_path(path: &Path) -> Self {
        let path = path.to_string_lossy().replace('\\', "/");
        if path.starts_with('/') {
            Self(Arc::from(format!("{FILE_SCHEME}{path}")))
        } else {
            Self(Arc::from(format!("{FILE_SCHEME}/{path}")))
        }
    }

    /// The raw URI text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert back to a filesystem path, if this is a `file://` URI.
    pub fn to_path(&self) -> Option<PathBuf> {
        let rest = self.0.strip_prefix(FILE_SCHEME)?;
        // `file:///C:/x` keeps a leading slash before the drive letter.
        let rest = match rest.as_bytes() {
            [b'/', _, b':', ..] => &rest[1..],
            _ => rest,
        };
        Some(PathBuf::from(rest))
    }

    /// The last path segment (`foo.sp` for `file:///a/foo.sp`).
    pub fn basename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The file extension without the dot, if any.
    pub fn extension(&self) -> Option<&str> {
        let base = self.basename();
        let idx = base.rfind('.')?;
        Some(&base[idx + 1..])
    }
}

impl fmt::Debug for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileUri({})", self.0)
    }
}

impl fmt::Display for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileUri {
    #[inline]
    fn from(uri: &str) -> Self {
        Self(Arc::from(uri))
    }
}

impl From<String> for FileUri {
    #[inline]
    fn from(uri: String) -> Self {
        Self(Arc::from(uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_uri_equality() {
        let a = FileUri::from("file:///a.sp");
        let b = FileUri::from("file:///a.sp");
        let c = FileUri::from("file:///b.sp");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_file_uri_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(FileUri::from("file:///a.sp"));
        set.insert(FileUri::from("file:///b.sp"));
        set.insert(FileUri::from("file:///a.sp")); // duplicate

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_file_uri_path_roundtrip() {
        let uri = FileUri::from_path(Path::new("/srv/scripting/plugin.sp"));
        assert_eq!(uri.as_str(), "file:///srv/scripting/plugin.sp");
        assert_eq!(uri.to_path(), Some(PathBuf::from("/srv/scripting/plugin.sp")));
    }

    #[test]
    fn test_file_uri_basename_and_extension() {
        let uri = FileUri::from("file:///srv/include/sourcemod.inc");
        assert_eq!(uri.basename(), "sourcemod.inc");
        assert_eq!(uri.extension(), Some("inc"));
    }

    #[test]
    fn test_non_file_uri_has_no_path() {
        let uri = FileUri::from("untitled:Untitled-1");
        assert!(uri.to_path().is_none());
    }
}
