//! Line-indexed view over a document's text.
//!
//! A [`TextDocument`] is the only text abstraction the engine needs: line
//! access, word-range detection and the positions of comments and string
//! literals. It also keeps a *masked* copy of the text where every comment
//! and literal body is blanked with spaces, so line matchers never trip
//! over a brace inside a string or a declaration inside a comment.

use std::sync::Arc;

use crate::base::{LineIndex, Position, Range, TextRange};

use super::lexer::{Token, TokenKind, tokenize};

/// A comment or literal region of the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TokenKind,
    pub range: Range,
}

/// Source text plus the indexes derived from it.
#[derive(Clone, Debug)]
pub struct TextDocument {
    text: Arc<str>,
    masked: String,
    line_index: LineIndex,
    /// Byte range of each line, excluding the line terminator.
    lines: Vec<std::ops::Range<usize>>,
    tokens: Vec<Token>,
    trivia: Vec<Trivia>,
}

impl TextDocument {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let line_index = LineIndex::new(&text);
        let tokens = tokenize(&text);

        let mut lines = Vec::with_capacity(line_index.len());
        let mut start = 0;
        for (idx, c) in text.char_indices() {
            if c == '\n' {
                let end = if idx > start && text.as_bytes()[idx - 1] == b'\r' {
                    idx - 1
                } else {
                    idx
                };
                lines.push(start..end);
                start = idx + 1;
            }
        }
        lines.push(start..text.len());

        let trivia = tokens
            .iter()
            .filter(|t| t.kind.is_trivia())
            .map(|t| Trivia {
                kind: t.kind,
                range: line_index.range(t.range),
            })
            .collect();

        let masked = mask_trivia(&text, &tokens);

        Self {
            text,
            masked,
            line_index,
            lines,
            tokens,
            trivia,
        }
    }

    /// The full document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of line `n` without its terminator. Out-of-range lines are empty.
    pub fn line_at(&self, n: usize) -> &str {
        self.lines
            .get(n)
            .and_then(|r| self.text.get(r.clone()))
            .unwrap_or("")
    }

    /// Line `n` with comment and literal bodies blanked out.
    ///
    /// Columns line up with [`line_at`](Self::line_at). String and char
    /// literals keep their quote characters.
    pub fn masked_line(&self, n: usize) -> &str {
        self.lines
            .get(n)
            .and_then(|r| self.masked.get(r.clone()))
            .unwrap_or("")
    }

    /// Text covered by `range`, clamped to the document.
    pub fn get_text(&self, range: Range) -> &str {
        let len = self.text.len();
        let start = self.clamped_offset(range.start).min(len);
        let end = self.clamped_offset(range.end).clamp(start, len);
        self.text.get(start..end).unwrap_or("")
    }

    /// Text covered by `range` with every comment replaced by one space.
    pub fn text_without_comments(&self, range: Range) -> String {
        let len = self.text.len();
        let start = self.clamped_offset(range.start).min(len);
        let end = self.clamped_offset(range.end).clamp(start, len);

        let mut out = String::with_capacity(end - start);
        let mut cursor = start;
        for comment in self.comments() {
            let c_start = self.clamped_offset(comment.range.start);
            let c_end = self.clamped_offset(comment.range.end);
            if c_end <= cursor || c_start >= end {
                continue;
            }
            if c_start > cursor {
                out.push_str(self.text.get(cursor..c_start).unwrap_or(""));
            }
            out.push(' ');
            cursor = c_end.min(end);
        }
        if cursor < end {
            out.push_str(self.text.get(cursor..end).unwrap_or(""));
        }
        out
    }

    fn clamped_offset(&self, pos: Position) -> usize {
        match self.lines.get(pos.line as usize) {
            Some(line) => (line.start + pos.col as usize).min(line.end),
            None => self.text.len(),
        }
    }

    /// Convert a position whose column counts UTF-16 code units, as editor
    /// hosts send them, to the byte column used everywhere in the engine.
    ///
    /// Columns past the end of the line clamp to its end.
    pub fn position_from_utf16(&self, pos: Position) -> Position {
        let line = self.line_at(pos.line as usize);
        let mut units = 0;
        for (idx, c) in line.char_indices() {
            if units >= pos.col {
                return Position::new(pos.line, idx as u32);
            }
            units += c.len_utf16() as u32;
        }
        Position::new(pos.line, line.len() as u32)
    }

    /// Convert a byte-column position to UTF-16 code units.
    pub fn position_to_utf16(&self, pos: Position) -> Position {
        let line = self.line_at(pos.line as usize);
        let end = (pos.col as usize).min(line.len());
        let units = line
            .get(..end)
            .unwrap_or(line)
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum();
        Position::new(pos.line, units)
    }

    pub fn range_to_utf16(&self, range: Range) -> Range {
        Range::new(self.position_to_utf16(range.start), self.position_to_utf16(range.end))
    }

    /// Range of the identifier touching `pos`, if any.
    ///
    /// A cursor placed right after the last character of a word still
    /// selects that word.
    pub fn word_range_at(&self, pos: Position) -> Option<Range> {
        let line = self.line_at(pos.line as usize);
        let col = (pos.col as usize).min(line.len());
        if !line.is_char_boundary(col) {
            return None;
        }

        let start = line[..col]
            .char_indices()
            .rev()
            .take_while(|&(_, c)| is_word_char(c))
            .last()
            .map_or(col, |(idx, _)| idx);
        let end = line[col..]
            .char_indices()
            .find(|&(_, c)| !is_word_char(c))
            .map_or(line.len(), |(idx, _)| col + idx);

        if start == end {
            return None;
        }
        let first = line[start..].chars().next()?;
        if !is_word_start(first) {
            return None;
        }
        Some(Range::on_line(pos.line, start as u32, (end - start) as u32))
    }

    /// The comment or literal containing `pos`, if any.
    pub fn trivia_at(&self, pos: Position) -> Option<&Trivia> {
        self.trivia.iter().find(|t| {
            // A line comment runs to the end of its line, so a cursor there
            // is still inside. Other trivia end before their last boundary.
            let inside_end = if t.kind == TokenKind::LineComment {
                pos <= t.range.end
            } else {
                pos < t.range.end
            };
            t.range.start <= pos && inside_end
        })
    }

    pub fn is_in_comment(&self, pos: Position) -> bool {
        self.trivia_at(pos).is_some_and(|t| t.kind.is_comment())
    }

    pub fn is_in_string(&self, pos: Position) -> bool {
        self.trivia_at(pos)
            .is_some_and(|t| matches!(t.kind, TokenKind::String | TokenKind::Char))
    }

    /// All comments, in document order.
    pub fn comments(&self) -> impl Iterator<Item = &Trivia> {
        self.trivia.iter().filter(|t| t.kind.is_comment())
    }

    /// Identifier tokens outside comments and literals, with their preceding
    /// token kind (used to spot member access).
    pub fn identifiers(&self) -> impl Iterator<Item = (Range, Option<TokenKind>)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TokenKind::Ident)
            .map(|(idx, t)| {
                let prev = idx
                    .checked_sub(1)
                    .and_then(|i| self.tokens.get(i))
                    .map(|p| p.kind);
                (self.line_index.range(t.range), prev)
            })
    }

    /// Convert a byte range into a line/column range.
    pub fn range(&self, range: TextRange) -> Range {
        self.line_index.range(range)
    }
}

/// Identifier characters, matching the language's ASCII identifiers and
/// tolerating Unicode identifiers in comments-turned-code.
pub fn is_word_char(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}

pub fn is_word_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn mask_trivia(text: &str, tokens: &[Token]) -> String {
    let mut bytes = text.as_bytes().to_vec();
    for token in tokens.iter().filter(|t| t.kind.is_trivia()) {
        let start = u32::from(token.range.start()) as usize;
        let end = u32::from(token.range.end()) as usize;
        let (start, end) = match token.kind {
            // Keep the quotes so `"..."` still reads as an argument.
            TokenKind::String | TokenKind::Char if end - start >= 2 => (start + 1, end - 1),
            TokenKind::String | TokenKind::Char => continue,
            _ => (start, end),
        };
        for b in &mut bytes[start..end] {
            if *b != b'\n' && *b != b'\r' {
                *b = b' ';
            }
        }
    }
    // Only whole characters are blanked, so the result is valid UTF-8.
    String::from_utf8(bytes).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
