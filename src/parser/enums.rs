//! Enums and enum structs.
//!
//! An enum struct opens a context whose member lines are parsed one by one.
//! A plain enum is read in one go: every line up to the closing brace is
//! consumed here, bounded by the configured member ceiling.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use smol_str::SmolStr;

use crate::base::{Position, Range};
use crate::hir::ItemDetail;
use crate::syntax::{DocComment, doc_comment_before, trailing_doc_comment};

use super::{Parser, State, is_keyword, split_top_level};

pub(super) static ENUM_STRUCT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*enum\s+struct\s+([A-Za-z_][A-Za-z0-9_]*)").expect("invalid enum struct regex")
});

pub(super) static ENUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*enum\b(?:\s+([A-Za-z_][A-Za-z0-9_]*))?").expect("invalid enum regex")
});

/// Leading member name, optionally behind an old-style `Tag:`.
static MEMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[A-Za-z_][A-Za-z0-9_]*\s*:\s*)?([A-Za-z_][A-Za-z0-9_]*)")
        .expect("invalid enum member regex")
});

impl Parser<'_> {
    pub(super) fn read_enum_struct(&mut self, n: usize, caps: &Captures<'_>) {
        let Some(name) = caps.get(1) else {
            return;
        };
        let range = Range::on_line(n as u32, name.start() as u32, name.len() as u32);
        let item = self
            .item(name.as_str(), range, ItemDetail::EnumStruct)
            .with_full_range(self.line_range(n))
            .with_description(doc_comment_before(self.doc, n as u32));
        self.items.insert(name.as_str(), item);

        let name_end = name.end();
        let name = SmolStr::new(name.as_str());
        self.states.push(State::EnumStruct {
            key: name.clone(),
            name: name.clone(),
        });

        // `enum struct Point { int x; int y; }` declares its fields inline.
        let doc = self.doc;
        let masked = doc.masked_line(n);
        if let Some(open) = masked[name_end..].find('{').map(|idx| name_end + idx + 1) {
            let close = masked[open..].find('}').map_or(masked.len(), |idx| open + idx);
            self.read_enum_struct_fields(n, &name, open, close);
        }
    }

    /// Read a plain enum starting at header line `n`.
    ///
    /// Leaves the cursor on the last consumed line: the one holding the
    /// closing brace, the last line of the file, or the line where the
    /// member ceiling was reached.
    pub(super) fn read_enum(&mut self, n: usize, caps: &Captures<'_>) {
        let doc = self.doc;
        let header = doc.masked_line(n);

        let (name, key, range) = match caps.get(1).filter(|m| !is_keyword(m.as_str())) {
            Some(m) => (
                SmolStr::new(m.as_str()),
                SmolStr::new(m.as_str()),
                Range::on_line(n as u32, m.start() as u32, m.len() as u32),
            ),
            None => {
                // Anonymous enums get a stable name from their position in the file.
                self.anonymous_enum_count += 1;
                let count = self.anonymous_enum_count;
                let col = header.find("enum").unwrap_or(0);
                (
                    SmolStr::from(format!("Enum #{count}")),
                    SmolStr::from(format!("{count}{}", self.basename())),
                    Range::on_line(n as u32, col as u32, 4),
                )
            }
        };

        let item = self
            .item(&name, range, ItemDetail::Enum)
            .with_full_range(self.line_range(n))
            .with_description(doc_comment_before(doc, n as u32));
        self.items.insert(key.clone(), item);
        self.states.push(State::Enum { key: key.clone() });

        let ceiling = self.config.enum_member_ceiling;
        let last_line = doc.line_count().saturating_sub(1);
        let mut line_nb = n;
        let mut opened = false;
        let mut iter = 0;

        let end = loop {
            let masked = doc.masked_line(line_nb);
            let mut from = 0;
            if !opened {
                if let Some(idx) = masked.find('{') {
                    opened = true;
                    from = idx + 1;
                }
            }
            if opened {
                let close = masked[from..].find('}').map(|idx| from + idx);
                self.read_enum_members(line_nb, n, &key, from, close.unwrap_or(masked.len()));
                if let Some(col) = close {
                    break Position::new(line_nb as u32, col as u32 + 1);
                }
            }
            if line_nb >= last_line {
                tracing::trace!(uri = %self.uri, enum_name = %name, "enum cut short by end of file");
                break Position::new(line_nb as u32, doc.line_at(line_nb).len() as u32);
            }
            if iter >= ceiling {
                tracing::trace!(uri = %self.uri, enum_name = %name, ceiling, "enum member ceiling reached");
                break Position::new(line_nb as u32, doc.line_at(line_nb).len() as u32);
            }
            iter += 1;
            line_nb += 1;
        };

        if let Some(state) = self.states.pop() {
            self.set_full_range_end(&state, end);
        }
        self.line_nb = line_nb;
    }

    /// Register the members found between byte `from` and `to` of line `n`.
    fn read_enum_members(&mut self, n: usize, header: usize, key: &SmolStr, from: usize, to: usize) {
        let doc = self.doc;
        let masked = doc.masked_line(n);
        let Some(segment) = masked.get(from..to) else {
            return;
        };

        for (offset, part) in split_top_level(segment) {
            let Some(member) = MEMBER_RE.captures(part).and_then(|c| c.get(1)) else {
                continue;
            };
            if is_keyword(member.as_str()) {
                continue;
            }
            let col = from + offset + member.start();
            let starts_line = masked[..col].trim().is_empty();

            let description = trailing_doc_comment(doc, n as u32).or_else(|| {
                (starts_line && n != header)
                    .then(|| doc_comment_before(doc, n as u32))
                    .flatten()
                    .map(|d| d.description)
            });

            let range = Range::on_line(n as u32, col as u32, member.len() as u32);
            let item = self
                .item(member.as_str(), range, ItemDetail::EnumMember { enum_key: key.clone() })
                .with_description(description.map(|description| DocComment {
                    description,
                    ..DocComment::default()
                }));
            self.items.insert(member.as_str(), item);
        }
    }
}
