//! Source text positions and ranges.

use std::fmt;

use super::FileUri;

// Re-export from text-size for byte offsets into a document
pub use text_size::TextRange;
pub use text_size::TextSize;

/// A line and column position in source text.
///
/// Both line and column are 0-indexed internally, but displayed as 1-indexed.
/// Columns count UTF-8 bytes within the line. Hosts that count UTF-16
/// code units convert at the boundary with
/// `TextDocument::position_from_utf16` and `position_to_utf16`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd)]
pub struct Position {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (in UTF-8 bytes, not characters)
    pub col: u32,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Get 1-indexed line number (for display).
    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    /// Get 1-indexed column number (for display).
    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// A span between two positions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A range covering `len` bytes of a single line.
    #[inline]
    pub const fn on_line(line: u32, col: u32, len: u32) -> Self {
        Self {
            start: Position::new(line, col),
            end: Position::new(line, col + len),
        }
    }

    /// Whether `pos` lies inside the range. The end position is inclusive
    /// so a cursor placed right after a closing brace still counts.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Whether the range spans more than one line.
    pub fn is_multiline(&self) -> bool {
        self.end.line > self.start.line
    }

    /// Rough size used to pick the innermost of several containing ranges.
    pub fn size_hint(&self) -> u64 {
        let lines = u64::from(self.end.line.saturating_sub(self.start.line));
        if lines == 0 {
            u64::from(self.end.col.saturating_sub(self.start.col))
        } else {
            lines * 10_000 + u64::from(self.end.col)
        }
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}-{:?}", self.start, self.end)
    }
}

/// A range inside a specific file.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Location {
    pub uri: FileUri,
    pub range: Range,
}

impl Location {
    pub fn new(uri: FileUri, range: Range) -> Self {
        Self { uri, range }
    }
}

/// Index for converting between byte offsets and line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position.
    pub fn position(&self, offset: TextSize) -> Position {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        let line_start = self.line_starts[line];
        let col = offset - line_start;

        Position {
            line: line as u32,
            col: col.into(),
        }
    }

    /// Convert a byte range to a line/column range.
    pub fn range(&self, range: TextRange) -> Range {
        Range::new(self.position(range.start()), self.position(range.end()))
    }

    /// Convert a line/column position to a byte offset.
    pub fn offset(&self, pos: Position) -> Option<TextSize> {
        let line_start = self.line_starts.get(pos.line as usize)?;
        Some(*line_start + TextSize::from(pos.col))
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    /// Check if there are no lines (never true, an empty text has one line).
    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        let pos = Position::new(0, 0);
        assert_eq!(format!("{}", pos), "1:1");

        let pos = Position::new(5, 10);
        assert_eq!(format!("{}", pos), "6:11");
    }

    #[test]
    fn test_range_contains() {
        let range = Range::new(Position::new(1, 4), Position::new(3, 1));

        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(2, 0)));
        assert!(range.contains(Position::new(3, 1)));
        assert!(!range.contains(Position::new(1, 3)));
        assert!(!range.contains(Position::new(3, 2)));
    }

    #[test]
    fn test_size_hint_prefers_inner_range() {
        let outer = Range::new(Position::new(0, 0), Position::new(10, 1));
        let inner = Range::new(Position::new(2, 4), Position::new(5, 5));
        assert!(inner.size_hint() < outer.size_hint());
    }

    #[test]
    fn test_line_index_multi_line() {
        let index = LineIndex::new("hello\nworld\n!");

        assert_eq!(index.position(TextSize::from(0)), Position::new(0, 0));
        assert_eq!(index.position(TextSize::from(5)), Position::new(0, 5));
        assert_eq!(index.position(TextSize::from(6)), Position::new(1, 0));
        assert_eq!(index.position(TextSize::from(11)), Position::new(1, 5));
        assert_eq!(index.position(TextSize::from(12)), Position::new(2, 0));
    }

    #[test]
    fn test_line_index_offset() {
        let index = LineIndex::new("hello\nworld");

        assert_eq!(index.offset(Position::new(0, 0)), Some(TextSize::from(0)));
        assert_eq!(index.offset(Position::new(1, 0)), Some(TextSize::from(6)));
        assert_eq!(index.offset(Position::new(1, 3)), Some(TextSize::from(9)));
        assert_eq!(index.offset(Position::new(4, 0)), None);
    }
}
