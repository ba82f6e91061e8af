//! # pawnsym-base
//!
//! Core library for SourcePawn symbol extraction, include-graph flattening
//! and position-based symbol resolution.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide      → IDE features (completion, hover, goto-def, signature help, outline)
//!   ↓
//! hir      → Symbol items, per-file tables, items repository, resolution
//!   ↓
//! parser   → Line parser with a context stack
//!   ↓
//! syntax   → Lexer, text documents, doc comments
//!   ↓
//! base     → Primitives (FileUri, Position, Range, LineIndex)
//! ```
//!
//! `project` (include resolution, workspace loading) and `config` sit beside
//! the stack and are used by every layer above `base`.

/// Foundation types: FileUri, positions, line index
pub mod base;

/// Engine configuration
pub mod config;

/// Error types for loading and configuration
pub mod error;

/// High-level IR: symbol model, repository and resolution
pub mod hir;

/// IDE features: completion, hover, goto-definition, find-references
pub mod ide;

/// Line parser
pub mod parser;

/// Include resolution and workspace loading
pub mod project;

/// Text documents and lexing
pub mod syntax;

pub use base::{FileUri, LineIndex, Location, Position, Range, TextRange, TextSize};
pub use config::EngineConfig;
pub use error::{ConfigError, LoadError};
pub use hir::{FileItems, ItemsRepository, PositionResolver, ResolveResult, SymbolItem, SymbolKind};
pub use ide::{Analysis, AnalysisHost};
pub use parser::parse_file;
pub use project::{FsIncludeResolver, IncludeResolver, MemoryIncludeResolver, WorkspaceLoader};
pub use syntax::TextDocument;
