//! `#include` and `#define` lines, and macro use tracking.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use smol_str::SmolStr;

use crate::base::Range;
use crate::hir::{IncludeRecord, ItemDetail};
use crate::project::include_file_name;

use super::{Parser, identifiers};

static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*#\s*(try)?include\s*[<"]\s*([^>"]+?)\s*(?:[>"]|$)"#).expect("invalid include regex")
});

static DEFINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#\s*define\s+([A-Za-z_][A-Za-z0-9_]*)(?:\([^)]*\))?(?:\s+(.*))?$")
        .expect("invalid define regex")
});

static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#\s*[A-Za-z_]+").expect("invalid directive regex"));

impl Parser<'_> {
    pub(super) fn parse_directive(&mut self, n: usize) {
        let doc = self.doc;
        let line = doc.masked_line(n);
        if let Some(caps) = INCLUDE_RE.captures(line) {
            self.read_include(n, &caps);
        } else if let Some(caps) = DEFINE_RE.captures(line) {
            self.read_define(n, &caps);
        }
    }

    fn read_include(&mut self, n: usize, caps: &Captures<'_>) {
        let Some(path) = caps.get(2) else {
            return;
        };
        let file = include_file_name(path.as_str());
        let target = self.resolver.resolve(&self.uri, &file);
        if target.is_none() {
            tracing::debug!(uri = %self.uri, include = %file, "unresolved include");
        }
        self.items.push_include(IncludeRecord {
            path: SmolStr::new(&file),
            target,
            range: Range::on_line(n as u32, path.start() as u32, path.len() as u32),
            optional: caps.get(1).is_some(),
        });
    }

    fn read_define(&mut self, n: usize, caps: &Captures<'_>) {
        let Some(name) = caps.get(1) else {
            return;
        };
        let doc = self.doc;
        let raw = doc.line_at(n);
        let masked = doc.masked_line(n);

        // Value as written, minus any trailing comment and continuation.
        let value = caps
            .get(2)
            .map(|m| {
                let len = masked[m.range()].trim_end().len();
                raw.get(m.start()..m.start() + len).unwrap_or("")
            })
            .map(|v| v.trim_end_matches('\\').trim())
            .unwrap_or("");

        let range = Range::on_line(n as u32, name.start() as u32, name.len() as u32);
        let item = self
            .item(name.as_str(), range, ItemDetail::Define { value: SmolStr::new(value) })
            .with_full_range(self.line_range(n))
            .with_description(self.doc_for_line(n));
        self.items.insert(name.as_str(), item);
        self.defines.insert(SmolStr::new(name.as_str()));
    }

    /// Record every use of a known define on line `n`.
    pub(super) fn scan_macro_uses(&mut self, n: usize) {
        if self.defines.is_empty() {
            return;
        }
        let doc = self.doc;
        let line = doc.masked_line(n);
        let from = if line.trim_start().starts_with('#') {
            if INCLUDE_RE.is_match(line) {
                return;
            }
            match DEFINE_RE.captures(line) {
                Some(caps) => caps.get(1).map_or(line.len(), |m| m.end()),
                None => DIRECTIVE_RE.find(line).map_or(0, |m| m.end()),
            }
        } else {
            0
        };

        for (offset, word) in identifiers(&line[from..]) {
            let col = from + offset;
            if self.defines.contains(word) && !line[..col].ends_with('.') {
                let range = Range::on_line(n as u32, col as u32, word.len() as u32);
                self.items.push_macro_use(word, range);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::base::FileUri;
    use crate::config::EngineConfig;
    use crate::hir::ItemDetail;
    use crate::parser::parse_file;
    use crate::parser::tests::parse;
    use crate::project::MemoryIncludeResolver;
    use crate::syntax::TextDocument;

    #[test]
    fn test_define_value_strips_comment() {
        let items = parse("#define MAX_NAME 64 // name buffer\n");
        let item = items.get("MAX_NAME").unwrap();
        assert_eq!(item.detail, ItemDetail::Define { value: "64".into() });
        assert_eq!(item.range.start.col, 8);
    }

    #[test]
    fn test_function_like_define() {
        let items = parse("#define SQUARE(%1) ((%1) * (%1))\n");
        assert_eq!(
            items.get("SQUARE").map(|i| i.detail.clone()),
            Some(ItemDetail::Define { value: "((%1) * (%1))".into() })
        );
    }

    #[test]
    fn test_includes_are_resolved() {
        let resolver = MemoryIncludeResolver::new()
            .with_include_directory("/sm/include")
            .with_file("/sm/include/sourcemod.inc")
            .with_file("/proj/include/util.inc");
        let uri = FileUri::from_path(Path::new("/proj/plugin.sp"));
        let doc = TextDocument::new("#include <sourcemod>\n#include \"util\"\n#tryinclude <missing>\n");
        let items = parse_file(&uri, &doc, &resolver, &EngineConfig::default());

        let includes = items.includes();
        assert_eq!(includes.len(), 3);
        assert_eq!(includes[0].path, "sourcemod.inc");
        assert_eq!(
            includes[0].target,
            Some(FileUri::from_path(Path::new("/sm/include/sourcemod.inc")))
        );
        assert_eq!(
            includes[1].target,
            Some(FileUri::from_path(Path::new("/proj/include/util.inc")))
        );
        assert_eq!(includes[2].target, None);
        assert!(includes[2].optional);
        assert_eq!(includes[0].range.start.col, 10);
    }

    #[test]
    fn test_macro_uses_recorded() {
        let items = parse("#define MAX 4\n#define TWICE MAX * 2\nint g_Values[MAX]; // MAX\n");
        let uses: Vec<_> = items
            .macro_uses()
            .iter()
            .map(|u| (u.name.as_str().to_string(), u.range.start.line, u.range.start.col))
            .collect();
        assert_eq!(uses, vec![("MAX".to_string(), 1, 14), ("MAX".to_string(), 2, 13)]);
    }
}
