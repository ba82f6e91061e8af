//! Line parser for SourcePawn files.
//!
//! The parser walks a document line by line and turns declarations into
//! [`SymbolItem`]s. It never builds a syntax tree: each line is matched
//! against a handful of patterns chosen by the current [`State`], and a
//! context stack with brace counting tracks which block the line belongs to.
//!
//! Lines are matched on the document's *masked* text, where comment and
//! string bodies are blanked, so patterns never match inside them.
//!
//! Parsing is infallible. Lines that match nothing are skipped; a block cut
//! short by the end of the file keeps everything registered so far.
//!
//! ```text
//! TopLevel ──enum struct──▶ EnumStruct ──method { ──▶ Function
//!    │  ├──methodmap─────▶ Methodmap  ──method { ──▶ Function
//!    │  │                      └──property {──▶ Property
//!    │  ├──enum { ... }  (read in one go)
//!    │  └──typeset───────▶ Typeset
//!    └──function {──────▶ Function
//! ```

mod enums;
mod functions;
mod methodmaps;
mod preproc;
mod state;
mod typedefs;
mod variables;

pub use state::{Frame, State, StateStack};

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{FileUri, Position, Range};
use crate::config::EngineConfig;
use crate::hir::{FileItems, ItemDetail, SymbolItem};
use crate::project::IncludeResolver;
use crate::syntax::{DocComment, TextDocument, doc_comment_before, trailing_doc_comment};

/// Words that can never be a type or a declared name.
pub(crate) const KEYWORDS: &[&str] = &[
    "break", "case", "const", "continue", "decl", "default", "delete", "do", "else", "enum",
    "for", "forward", "funcenum", "functag", "goto", "if", "methodmap", "native", "new",
    "null", "operator", "property", "public", "return", "sizeof", "static", "stock", "struct",
    "switch", "this", "typedef", "typeset", "using", "view_as", "while",
];

pub(crate) fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("invalid identifier regex"));

/// Parse `doc` into a fresh symbol table for `uri`.
pub fn parse_file(
    uri: &FileUri,
    doc: &TextDocument,
    resolver: &dyn IncludeResolver,
    config: &EngineConfig,
) -> FileItems {
    Parser::new(uri.clone(), doc, resolver, config).parse()
}

/// Whether the lines consumed by one step still need brace counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Braces {
    Count,
    /// The step balanced its own braces (enum bodies).
    Skip,
}

/// Line-oriented parser state for one file.
pub struct Parser<'a> {
    uri: FileUri,
    doc: &'a TextDocument,
    resolver: &'a dyn IncludeResolver,
    config: &'a EngineConfig,
    items: FileItems,
    states: StateStack,
    line_nb: usize,
    anonymous_enum_count: u32,
    /// Names of `#define`s whose uses are recorded as macro expansion sites.
    defines: FxHashSet<SmolStr>,
}

impl<'a> Parser<'a> {
    pub fn new(
        uri: FileUri,
        doc: &'a TextDocument,
        resolver: &'a dyn IncludeResolver,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            items: FileItems::new(uri.clone()),
            uri,
            doc,
            resolver,
            config,
            states: StateStack::new(),
            line_nb: 0,
            anonymous_enum_count: 0,
            defines: FxHashSet::default(),
        }
    }

    /// Also track uses of defines declared in other files.
    pub fn with_known_defines<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = SmolStr>,
    {
        self.defines.extend(names);
        self
    }

    pub fn parse(mut self) -> FileItems {
        let line_count = self.doc.line_count();
        while self.line_nb < line_count {
            let start = self.line_nb;
            let braces = self.parse_line();
            for n in start..=self.line_nb.min(line_count - 1) {
                if braces == Braces::Count {
                    self.close_blocks(n);
                }
                self.scan_macro_uses(n);
            }
            self.line_nb += 1;
        }

        // Blocks still open at end of file run to its last character.
        let last = line_count.saturating_sub(1);
        let end = Position::new(last as u32, self.doc.line_at(last).len() as u32);
        for state in self.states.drain() {
            self.set_full_range_end(&state, end);
        }

        tracing::debug!(
            uri = %self.uri,
            symbols = self.items.len(),
            includes = self.items.includes().len(),
            "parsed file"
        );
        self.items
    }

    fn parse_line(&mut self) -> Braces {
        let n = self.line_nb;
        let doc = self.doc;
        let line = doc.masked_line(n);
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            return Braces::Count;
        }
        if trimmed.starts_with('#') {
            self.parse_directive(n);
            return Braces::Count;
        }

        let at_block_level = self.states.at_block_level();
        match self.states.current().clone() {
            State::TopLevel if at_block_level => self.parse_top_level(n),
            State::EnumStruct { name, .. } if at_block_level => {
                self.parse_enum_struct_member(n, &name);
                Braces::Count
            }
            State::Methodmap { name, .. } if at_block_level => {
                self.parse_methodmap_member(n, &name);
                Braces::Count
            }
            State::Function {
                name,
                key,
                enum_struct,
            } => {
                self.parse_locals(n, &name, &key, enum_struct.as_ref());
                Braces::Count
            }
            _ => Braces::Count,
        }
    }

    fn parse_top_level(&mut self, n: usize) -> Braces {
        let doc = self.doc;
        let line = doc.masked_line(n);

        if let Some(caps) = enums::ENUM_STRUCT_RE.captures(line) {
            self.read_enum_struct(n, &caps);
            return Braces::Count;
        }
        if let Some(caps) = enums::ENUM_RE.captures(line) {
            self.read_enum(n, &caps);
            return Braces::Skip;
        }
        if let Some(caps) = methodmaps::METHODMAP_RE.captures(line) {
            self.read_methodmap(n, &caps);
            return Braces::Count;
        }
        if self.read_typedef(n) {
            return Braces::Count;
        }
        if let Some(header) = functions::FunctionHeader::parse(line) {
            self.read_function(n, header, functions::Callable::Function);
            return Braces::Count;
        }
        self.read_globals(n);
        Braces::Count
    }

    fn close_blocks(&mut self, n: usize) {
        let closed = self.states.feed_line(self.doc.masked_line(n));
        for (state, col) in closed {
            self.set_full_range_end(&state, Position::new(n as u32, col));
        }
    }

    fn set_full_range_end(&mut self, state: &State, end: Position) {
        if let Some(item) = state.key().and_then(|key| self.items.get_mut(key)) {
            item.full_range.end = end;
        }
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn item(&self, name: &str, range: Range, detail: ItemDetail) -> SymbolItem {
        SymbolItem::new(name, self.uri.clone(), range, detail)
    }

    /// Range of the declaration on line `n`: first to last non-blank column
    /// of the masked line.
    fn line_range(&self, n: usize) -> Range {
        let line = self.doc.masked_line(n);
        let start = line.len() - line.trim_start().len();
        let end = line.trim_end().len().max(start);
        Range::new(
            Position::new(n as u32, start as u32),
            Position::new(n as u32, end as u32),
        )
    }

    /// Documentation above line `n`, or failing that a trailing comment on it.
    fn doc_for_line(&self, n: usize) -> Option<DocComment> {
        doc_comment_before(self.doc, n as u32).or_else(|| {
            trailing_doc_comment(self.doc, n as u32).map(|description| DocComment {
                description,
                ..DocComment::default()
            })
        })
    }

    fn basename(&self) -> &str {
        self.uri.basename()
    }
}

/// Key of a nested item: scope names and the item name joined with `::`.
pub(crate) fn scoped_key(parts: &[&str]) -> SmolStr {
    SmolStr::from(parts.join("::"))
}

/// Identifiers of `text` with their byte offsets. Suffixes of number
/// literals (`0x1F`) are not identifiers.
pub(crate) fn identifiers(text: &str) -> impl Iterator<Item = (usize, &str)> {
    IDENT_RE
        .find_iter(text)
        .filter(|m| {
            text[..m.start()]
                .bytes()
                .next_back()
                .is_none_or(|b| !b.is_ascii_digit())
        })
        .map(|m| (m.start(), m.as_str()))
}

/// Collapse runs of whitespace into single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `text` at commas outside brackets, braces and parentheses.
/// Yields each part with its byte offset. Stops at a top-level `;`.
pub(crate) fn split_top_level(text: &str) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut depth = 0u32;
    let mut start = 0;
    for (idx, b) in text.bytes().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push((start, &text[start..idx]));
                start = idx + 1;
            }
            b';' if depth == 0 => {
                parts.push((start, &text[start..idx]));
                return parts;
            }
            _ => {}
        }
    }
    parts.push((start, &text[start..]));
    parts
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::hir::SymbolKind;
    use crate::project::MemoryIncludeResolver;

    pub(crate) fn parse(text: &str) -> FileItems {
        let doc = TextDocument::new(text);
        let uri = FileUri::from("file:///test.sp");
        parse_file(&uri, &doc, &MemoryIncludeResolver::new(), &EngineConfig::default())
    }

    #[test]
    fn test_split_top_level() {
        let parts: Vec<_> = split_top_level("a = {1, 2}, b[3], c = F(x, y); d")
            .into_iter()
            .map(|(_, p)| p.trim())
            .collect();
        assert_eq!(parts, vec!["a = {1, 2}", "b[3]", "c = F(x, y)"]);
    }

    #[test]
    fn test_mixed_file() {
        let items = parse(
            "#define MAX 10\n\
             int g_Count;\n\
             enum struct Point {\n\
             \x20   int x;\n\
             \x20   int y;\n\
             }\n\
             methodmap Base {\n\
             \x20   public void m() {}\n\
             }\n\
             void F(int a) {\n\
             \x20   int V = a;\n\
             }\n",
        );
        let names: Vec<_> = items.items().map(|i| (i.name.as_str().to_string(), i.kind())).collect();
        assert_eq!(
            names,
            vec![
                ("MAX".to_string(), SymbolKind::Constant),
                ("g_Count".to_string(), SymbolKind::Variable),
                ("Point".to_string(), SymbolKind::EnumStruct),
                ("x".to_string(), SymbolKind::Property),
                ("y".to_string(), SymbolKind::Property),
                ("Base".to_string(), SymbolKind::Methodmap),
                ("m".to_string(), SymbolKind::Method),
                ("F".to_string(), SymbolKind::Function),
                ("a".to_string(), SymbolKind::Variable),
                ("V".to_string(), SymbolKind::Variable),
            ]
        );
    }

    #[test]
    fn test_full_ranges_close_on_brace() {
        let items = parse("void F()\n{\n    if (x) {\n    }\n}\nint after;");
        let f = items.get("F").unwrap();
        assert_eq!(f.full_range, Range::new(Position::new(0, 0), Position::new(4, 1)));
        assert!(items.get("after").is_some());
    }

    #[test]
    fn test_unclosed_block_runs_to_eof() {
        let items = parse("void F() {\n    int x;\n");
        let f = items.get("F").unwrap();
        assert_eq!(f.full_range.end, Position::new(2, 0));
        assert!(items.get("F::x").is_some());
    }

    #[test]
    fn test_idempotent() {
        let text = "enum { A, B }\nenum { C }\nint x;\nvoid F() { }\n";
        let first = parse(text);
        let second = parse(text);
        assert!(first.same_declarations(&second));
    }
}
