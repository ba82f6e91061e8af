//! Foundation types for the pawnsym engine.
//!
//! This module provides fundamental types used throughout the engine:
//! - [`FileUri`] - Cheap file identities
//! - [`Position`], [`Range`], [`Location`] - Line/column positions
//! - [`TextRange`], [`TextSize`], [`LineIndex`] - Byte offsets and conversion
//!
//! This module has NO dependencies on other pawnsym modules.

mod span;
mod uri;

pub use span::{LineIndex, Location, Position, Range, TextRange, TextSize};
pub use uri::FileUri;

// Re-export text-size types for convenience
pub use text_size;
