//! Engine configuration.
//!
//! Everything the host can tune lives in [`EngineConfig`]: include search
//! folders, the project's main file and the enum-member safety bound.

use std::path::{Path, PathBuf};

use crate::base::FileUri;
use crate::error::ConfigError;

/// Default number of lines read for one plain enum body before giving up.
///
/// Guards against a missing closing brace swallowing the rest of the file.
pub const DEFAULT_ENUM_MEMBER_CEILING: usize = 100;

/// Extension appended to include paths that carry no recognised extension.
pub const INCLUDE_EXTENSION: &str = "inc";

/// Host-provided engine settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct EngineConfig {
    /// Extra include folders, searched after the file's own folder and its
    /// `include/` subfolder.
    pub include_directories: Vec<PathBuf>,
    /// Project entry file. Include files under its folder resolve symbols
    /// as if the query came from this file.
    pub main_path: Option<PathBuf>,
    /// Maximum number of lines read for one plain enum body.
    pub enum_member_ceiling: usize,
    /// Extensions (without dot) the workspace loader treats as source.
    pub source_extensions: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            include_directories: Vec::new(),
            main_path: None,
            enum_member_ceiling: DEFAULT_ENUM_MEMBER_CEILING,
            source_extensions: vec!["sp".to_string(), INCLUDE_EXTENSION.to_string()],
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_include_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_directories.push(dir.into());
        self
    }

    pub fn with_main_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.main_path = Some(path.into());
        self
    }

    pub fn with_enum_member_ceiling(mut self, ceiling: usize) -> Self {
        self.enum_member_ceiling = ceiling;
        self
    }

    pub fn with_source_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Check the settings for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enum_member_ceiling == 0 {
            return Err(ConfigError::ZeroEnumCeiling);
        }
        if self.source_extensions.is_empty() {
            return Err(ConfigError::NoSourceExtensions);
        }
        Ok(())
    }

    /// Parse and validate settings sent by the host as JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            serde_json::from_value(value).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Whether `path` has one of the configured source extensions.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.source_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    /// The main file `uri` should be redirected to, if any.
    ///
    /// Only include files (`.inc`) below the main file's folder are
    /// redirected; the main file itself and `.sp` files are not.
    pub fn main_file_for(&self, uri: &FileUri) -> Option<FileUri> {
        let main = self.main_path.as_deref()?;
        if uri.extension() != Some(INCLUDE_EXTENSION) {
            return None;
        }
        let path = uri.to_path()?;
        let root = main.parent()?;
        if path == main || !path.starts_with(root) {
            return None;
        }
        Some(FileUri::from_path(main))
    }
}
