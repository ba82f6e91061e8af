//! Resolving `#include` paths to file URIs.
//!
//! The parser and the position resolver only need two things from the host:
//! the ordered folders to search for a given file, and a file-existence
//! check. [`IncludeResolver`] is that seam. [`FsIncludeResolver`] answers
//! from the real filesystem, [`MemoryIncludeResolver`] from a fixed set of
//! known paths.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::base::FileUri;
use crate::config::{EngineConfig, INCLUDE_EXTENSION};

/// Host-side include lookup.
pub trait IncludeResolver: Send + Sync {
    /// Folders searched for the includes of `uri`, in priority order.
    fn possible_include_folders(&self, uri: &FileUri) -> Vec<PathBuf>;

    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Resolve an include path as written in `uri` to the first existing file.
    ///
    /// `include` should already carry its extension, see [`include_file_name`].
    fn resolve(&self, uri: &FileUri, include: &str) -> Option<FileUri> {
        self.possible_include_folders(uri)
            .into_iter()
            .map(|folder| normalize(&folder.join(include)))
            .find(|path| self.exists(path))
            .map(|path| FileUri::from_path(&path))
    }
}

/// Apply the default `.inc` extension to an include path that has neither
/// `.inc` nor `.sp`.
pub fn include_file_name(path: &str) -> Cow<'_, str> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".inc") || lower.ends_with(".sp") {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("{path}.{INCLUDE_EXTENSION}"))
    }
}

/// The standard search order: the including file's folder, its `include/`
/// subfolder, then each configured folder.
pub fn default_include_folders(uri: &FileUri, include_directories: &[PathBuf]) -> Vec<PathBuf> {
    let mut folders = Vec::with_capacity(include_directories.len() + 2);
    if let Some(dir) = uri.to_path().as_deref().and_then(Path::parent) {
        folders.push(dir.to_path_buf());
        folders.push(dir.join("include"));
    }
    folders.extend(include_directories.iter().cloned());
    folders
}

/// Lexically fold `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ============================================================================
// RESOLVERS
// ============================================================================

/// Resolves includes against the real filesystem.
#[derive(Clone, Debug, Default)]
pub struct FsIncludeResolver {
    include_directories: Vec<PathBuf>,
}

impl FsIncludeResolver {
    pub fn new(include_directories: Vec<PathBuf>) -> Self {
        Self { include_directories }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.include_directories.clone())
    }
}

impl IncludeResolver for FsIncludeResolver {
    fn possible_include_folders(&self, uri: &FileUri) -> Vec<PathBuf> {
        default_include_folders(uri, &self.include_directories)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Resolves includes against a fixed set of paths, for hosts with a
/// virtual file system.
#[derive(Clone, Debug, Default)]
pub struct MemoryIncludeResolver {
    files: FxHashSet<PathBuf>,
    include_directories: Vec<PathBuf>,
}

impl MemoryIncludeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_directories.push(dir.into());
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.add_file(path);
        self
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        self.files.insert(normalize(path.as_ref()));
    }
}

impl IncludeResolver for MemoryIncludeResolver {
    fn possible_include_folders(&self, uri: &FileUri) -> Vec<PathBuf> {
        default_include_folders(uri, &self.include_directories)
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_file_name() {
        assert_eq!(include_file_name("sourcemod"), "sourcemod.inc");
        assert_eq!(include_file_name("util.inc"), "util.inc");
        assert_eq!(include_file_name("other.sp"), "other.sp");
        assert_eq!(include_file_name("sub/dir/file"), "sub/dir/file.inc");
    }

    #[test]
    fn test_default_folder_order() {
        let uri = FileUri::from_path(Path::new("/proj/scripting/plugin.sp"));
        let folders = default_include_folders(&uri, &[PathBuf::from("/sm/include")]);
        assert_eq!(
            folders,
            vec![
                PathBuf::from("/proj/scripting"),
                PathBuf::from("/proj/scripting/include"),
                PathBuf::from("/sm/include"),
            ]
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d.inc")), PathBuf::from("/a/c/d.inc"));
    }

    #[test]
    fn test_memory_resolver_prefers_local_folder() {
        let resolver = MemoryIncludeResolver::new()
            .with_include_directory("/sm/include")
            .with_file("/sm/include/util.inc")
            .with_file("/proj/include/util.inc");
        let uri = FileUri::from_path(Path::new("/proj/plugin.sp"));

        assert_eq!(
            resolver.resolve(&uri, "util.inc"),
            Some(FileUri::from_path(Path::new("/proj/include/util.inc")))
        );
        assert_eq!(resolver.resolve(&uri, "missing.inc"), None);
    }

    #[test]
    fn test_fs_resolver_finds_configured_folder() {
        let dir = tempfile::tempdir().unwrap();
        let sm = dir.path().join("sm");
        std::fs::create_dir_all(&sm).unwrap();
        std::fs::write(sm.join("sdktools.inc"), "native void Foo();").unwrap();

        let resolver = FsIncludeResolver::new(vec![sm.clone()]);
        let uri = FileUri::from_path(&dir.path().join("plugin.sp"));

        assert_eq!(
            resolver.resolve(&uri, "sdktools.inc"),
            Some(FileUri::from_path(&sm.join("sdktools.inc")))
        );
    }
}
