//! Bulk loading of source files from disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::base::FileUri;
use crate::error::LoadError;
use crate::hir::FileItems;
use crate::ide::AnalysisHost;
use crate::syntax::TextDocument;

/// Loads workspace files into an [`AnalysisHost`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceLoader;

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads every source file below `path` into `host`.
    ///
    /// Files are parsed in parallel and installed together, so references
    /// between them are recorded whatever the walk order. Unreadable files
    /// are skipped and reported in a [`LoadError::Partial`]; the others stay
    /// loaded. Returns the number of files loaded.
    pub fn load_directory(&self, path: impl AsRef<Path>, host: &mut AnalysisHost) -> Result<usize, LoadError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(LoadError::DirectoryNotFound(path.to_path_buf()));
        }
        let paths = collect_file_paths(path, host);

        let shared: &AnalysisHost = host;
        let results: Vec<_> = paths
            .par_iter()
            .map(|path| load_and_parse(path, shared))
            .collect();

        let mut parsed = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(file) => parsed.push(file),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable file");
                    errors.push(err);
                }
            }
        }

        let loaded = parsed.len();
        host.set_parsed_files(parsed);
        tracing::info!(dir = %path.display(), loaded, failed = errors.len(), "workspace loaded");

        if errors.is_empty() {
            Ok(loaded)
        } else {
            Err(LoadError::Partial(errors))
        }
    }

    /// Loads a single file into `host`.
    pub fn load_file(&self, path: impl AsRef<Path>, host: &mut AnalysisHost) -> Result<FileUri, LoadError> {
        let path = path.as_ref();
        if !host.config().is_source_file(path) {
            return Err(LoadError::NotSourceFile(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|err| LoadError::io(path, err))?;
        let uri = FileUri::from_path(path);
        host.set_file_content(uri.clone(), text);
        Ok(uri)
    }
}

/// Source files below `dir`, in a stable order.
fn collect_file_paths(dir: &Path, host: &AnalysisHost) -> Vec<PathBuf> {
    let mut paths: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && host.config().is_source_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();
    paths
}

fn load_and_parse(path: &Path, host: &AnalysisHost) -> Result<(Arc<TextDocument>, FileItems), LoadError> {
    let text = std::fs::read_to_string(path).map_err(|err| LoadError::io(path, err))?;
    let uri = FileUri::from_path(path);
    let doc = TextDocument::new(text);
    let items = host.parse(&uri, &doc);
    Ok((Arc::new(doc), items))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::base::Position;
    use crate::config::EngineConfig;

    #[test]
    fn test_load_directory_links_files() {
        let dir = tempfile::tempdir().unwrap();
        let include = dir.path().join("include");
        fs::create_dir(&include).unwrap();
        fs::write(include.join("util.inc"), "stock int Twice(int x) {\n    return x * 2;\n}\n").unwrap();
        fs::write(dir.path().join("plugin.sp"), "#include <util>\nint g = Twice(2);\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not source").unwrap();

        let mut host = AnalysisHost::new(EngineConfig::default());
        let loaded = WorkspaceLoader::new().load_directory(dir.path(), &mut host).unwrap();
        assert_eq!(loaded, 2);

        let plugin = FileUri::from_path(&dir.path().join("plugin.sp"));
        let util = FileUri::from_path(&include.join("util.inc"));
        let goto = host.analysis().goto_definition(&plugin, Position::new(1, 9)).unwrap();
        assert_eq!(goto.targets[0].uri, util);

        let refs = host.analysis().find_references(&util, Position::new(0, 11), false).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].uri, plugin);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = AnalysisHost::new(EngineConfig::default());
        let err = WorkspaceLoader::new()
            .load_directory(dir.path().join("absent"), &mut host)
            .unwrap_err();
        assert!(matches!(err, LoadError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_load_file_rejects_non_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.md");
        fs::write(&path, "# readme").unwrap();
        let mut host = AnalysisHost::new(EngineConfig::default());
        let err = WorkspaceLoader::new().load_file(&path, &mut host).unwrap_err();
        assert!(matches!(err, LoadError::NotSourceFile(_)));
    }
}
