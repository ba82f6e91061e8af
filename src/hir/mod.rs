//! Symbol model and queries over it.
//!
//! - [`symbols`]: the [`SymbolItem`] record and its kinds
//! - [`file_items`]: one parsed file's symbol table and include list
//! - [`repository`]: the URI-keyed store and include-closure flattening
//! - [`resolve`]: what the word at a position refers to
//! - [`types`]: receiver type inference and methodmap inheritance
//! - [`references`]: recording where items are used

pub mod file_items;
pub mod references;
pub mod repository;
pub mod resolve;
pub mod scope;
pub mod symbols;
pub mod types;

pub use file_items::{FileItems, IncludeRecord, MacroUse};
pub use references::{collect_references, purge_references};
pub use repository::{AllItems, ItemsRepository};
pub use resolve::{PositionResolver, ResolveResult, TokenRole, classify, word_at};
pub use scope::ScopeContext;
pub use symbols::{
    Definition, GLOBAL_IDENTIFIER, ItemDetail, Parameter, Parent, References, Signature,
    SymbolItem, SymbolKind, Visibility,
};
pub use types::{Step, expand_inheritance, infer_receiver_type, members_named, members_of};
