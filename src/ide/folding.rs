//! Folding ranges: collapsible code regions.
//!
//! Every declaration spanning several lines folds, as does every multi-line
//! comment.

use crate::hir::FileItems;
use crate::syntax::TextDocument;

/// A folding range with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldingRange {
    /// Start line (0-indexed)
    pub start_line: u32,
    /// Start column (0-indexed)
    pub start_col: u32,
    /// End line (0-indexed)
    pub end_line: u32,
    /// End column (0-indexed)
    pub end_col: u32,
    /// Whether this is a comment region
    pub is_comment: bool,
}

/// Get folding ranges for a file.
pub fn folding_ranges(file: &FileItems, doc: &TextDocument) -> Vec<FoldingRange> {
    let declarations = file
        .items()
        .map(|item| (item.full_range, false))
        .filter(|(range, _)| range.is_multiline());
    let comments = doc
        .comments()
        .map(|c| (c.range, true))
        .filter(|(range, _)| range.is_multiline());

    let mut ranges: Vec<FoldingRange> = declarations
        .chain(comments)
        .map(|(range, is_comment)| FoldingRange {
            start_line: range.start.line,
            start_col: range.start.col,
            end_line: range.end.line,
            end_col: range.end.col,
            is_comment,
        })
        .collect();

    // Sort by start line
    ranges.sort_by_key(|r| (r.start_line, r.start_col));
    ranges.dedup();
    ranges
}
