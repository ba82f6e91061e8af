//! IDE features: high-level APIs for editor requests.
//!
//! This module sits between the symbol model (HIR) and whatever protocol
//! layer a host puts in front of it. Each function corresponds to one
//! editor request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: take a [`PositionResolver`](crate::hir::PositionResolver) or a
//!    file's items in, return data out
//! 2. **No protocol types**: our own result types, converted at the boundary
//! 3. **Quiet in comments and strings**: requests there return `None`
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use pawnsym::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new(EngineConfig::default());
//! host.set_file_content(uri.clone(), "int g_Count;\n");
//!
//! let analysis = host.analysis();
//! let symbols = analysis.document_symbols(&uri);
//! ```

mod analysis;
mod completion;
mod document_links;
mod folding;
mod goto;
mod hover;
mod references;
mod signature;
mod symbols;

pub use analysis::{Analysis, AnalysisHost};
pub use completion::{CompletionItem, completions};
pub use document_links::{DocumentLink, document_links};
pub use folding::{FoldingRange, folding_ranges};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use hover::{HoverResult, declaration, hover, render};
pub use references::find_references;
pub use signature::{ParameterInfo, SignatureHelp, SignatureInfo, signature_help};
pub use symbols::{DocumentSymbol, document_symbols};
