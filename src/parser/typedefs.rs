//! Function types: `typedef`, `typeset`, `functag` and `funcenum`.
//!
//! All of them become Interface items. A `typedef` or `functag` carries the
//! signature it names; a `typeset`/`funcenum` is a set of signatures and
//! carries none.

use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

use crate::base::{Position, Range};
use crate::hir::ItemDetail;
use crate::syntax::doc_comment_before;

use super::{Parser, State};

static TYPEDEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*typedef\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*function\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*\[\s*\])*\s*\(",
    )
    .expect("invalid typedef regex")
});

static TYPESET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:typeset|funcenum)\s+([A-Za-z_][A-Za-z0-9_]*)").expect("invalid typeset regex")
});

/// `functag public Tag:Name(...)` or the older `functag Name Tag:public(...)`.
static FUNCTAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*functag\s+(?:public\s+(?:([A-Za-z_][A-Za-z0-9_]*)\s*:\s*)?([A-Za-z_][A-Za-z0-9_]*)|([A-Za-z_][A-Za-z0-9_]*)\s+(?:([A-Za-z_][A-Za-z0-9_]*)\s*:\s*)?public)\s*\(",
    )
    .expect("invalid functag regex")
});

impl Parser<'_> {
    /// Try the function type forms on line `n`. Returns whether one matched.
    pub(super) fn read_typedef(&mut self, n: usize) -> bool {
        let doc = self.doc;
        let line = doc.masked_line(n);

        if let Some(caps) = TYPEDEF_RE.captures(line) {
            let (Some(name), Some(ret), Some(whole)) = (caps.get(1), caps.get(2), caps.get(0)) else {
                return false;
            };
            self.read_function_type(n, name.as_str(), name.start(), ret.as_str(), whole.end() - 1);
            return true;
        }

        if let Some(caps) = FUNCTAG_RE.captures(line) {
            let Some(whole) = caps.get(0) else {
                return false;
            };
            let (name, tag) = match caps.get(2) {
                Some(name) => (name, caps.get(1)),
                None => match caps.get(3) {
                    Some(name) => (name, caps.get(4)),
                    None => return false,
                },
            };
            let ret = tag.map_or("", |t| t.as_str());
            self.read_function_type(n, name.as_str(), name.start(), ret, whole.end() - 1);
            return true;
        }

        if let Some(name) = TYPESET_RE.captures(line).and_then(|c| c.get(1)) {
            let range = Range::on_line(n as u32, name.start() as u32, name.len() as u32);
            let item = self
                .item(name.as_str(), range, ItemDetail::Interface { signature: None })
                .with_full_range(self.line_range(n))
                .with_description(doc_comment_before(doc, n as u32));
            self.items.insert(name.as_str(), item);
            self.states.push(State::Typeset {
                key: SmolStr::new(name.as_str()),
            });
            return true;
        }

        false
    }

    fn read_function_type(&mut self, n: usize, name: &str, name_col: usize, ret: &str, paren: usize) {
        let start = self.line_range(n).start;
        let range = Range::on_line(n as u32, name_col as u32, name.len() as u32);

        let (signature, end, end_line) = match self.read_signature(n, paren) {
            Some(span) => {
                let signature = self.signature(start, &span, ret);
                let end = self.line_range(span.end_line).end;
                (Some(signature), end, span.end_line)
            }
            None => (None, self.line_range(n).end, n),
        };
        let item = self
            .item(name, range, ItemDetail::Interface { signature })
            .with_full_range(Range::new(start, Position::new(end.line, end.col)))
            .with_description(doc_comment_before(self.doc, n as u32));
        self.items.insert(name, item);
        self.line_nb = end_line;
    }
}

#[cfg(test)]
mod tests {
    use crate::base::Position;
    use crate::hir::SymbolKind;
    use crate::parser::tests::parse;

    #[test]
    fn test_typedef() {
        let items = parse("typedef ConCmd = function Action (int client,\n    int args);\n");
        let item = items.get("ConCmd").unwrap();
        assert_eq!(item.kind(), SymbolKind::Interface);
        let signature = item.signature().unwrap();
        assert_eq!(signature.return_type, "Action");
        assert_eq!(signature.params.len(), 2);
        assert_eq!(item.full_range.end, Position::new(1, 14));
    }

    #[test]
    fn test_typeset_body_is_skipped() {
        let items = parse(
            "typeset SQLCallback\n{\n    function void (Database db, int data);\n    function void (int x);\n};\nint after;\n",
        );
        let item = items.get("SQLCallback").unwrap();
        assert!(item.signature().is_none());
        assert_eq!(item.full_range.end, Position::new(4, 1));
        assert!(items.items().all(|i| i.name != "db" && i.name != "x"));
        assert!(items.get("after").is_some());
    }

    #[test]
    fn test_functag_forms() {
        let items = parse(
            "functag public Action:Timer(Handle:timer, any:data);\nfunctag SQLTCallback public(Handle:owner, Handle:hndl);\n",
        );
        let timer = items.get("Timer").unwrap();
        assert_eq!(timer.signature().map(|s| s.return_type.as_str()), Some("Action"));
        assert_eq!(items.get("SQLTCallback").map(|i| i.kind()), Some(SymbolKind::Interface));
    }
}
