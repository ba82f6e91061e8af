//! Files on disk: include resolution and workspace loading.

mod include;
mod workspace_loader;

pub use include::{
    FsIncludeResolver, IncludeResolver, MemoryIncludeResolver, default_include_folders, include_file_name,
    normalize,
};
pub use workspace_loader::WorkspaceLoader;
