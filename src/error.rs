//! Error types for the fallible edges of the engine.
//!
//! Parsing and position queries never fail; they degrade to skipped lines
//! and empty results. Only loading files from disk and validating
//! configuration can return an error.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading source files from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("not a source file: {}", .0.display())]
    NotSourceFile(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Some files of a directory load could not be read. The rest were loaded.
    #[error("failed to load {} file(s):\n  {}", .0.len(), join_errors(.0))]
    Partial(Vec<LoadError>),
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}

fn join_errors(errors: &[LoadError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// Invalid engine configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("enum member ceiling must be at least 1")]
    ZeroEnumCeiling,

    #[error("source extension list is empty")]
    NoSourceExtensions,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
