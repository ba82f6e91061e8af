//! Variable declarations: globals, function locals and enum struct fields.

use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

use crate::base::Range;
use crate::hir::{ItemDetail, Parent};

use super::{Parser, is_keyword, scoped_key, split_top_level};

static DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*((?:(?:const|static|public|stock|decl|new)\s+)*)(?:([A-Za-z_][A-Za-z0-9_]*)(?:\s*\[[^\]]*\])*\s+)?(.*)$",
    )
    .expect("invalid declaration regex")
});

/// One declarator: `&name`, `Tag:name`, `name[3][4]`, without initializer.
static DECLARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*&?\s*(?:([A-Za-z_][A-Za-z0-9_]*)\s*:\s*)?([A-Za-z_][A-Za-z0-9_]*)\s*(?:\[[^\]]*\]\s*)*$",
    )
    .expect("invalid declarator regex")
});

static FOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*for\s*\(").expect("invalid for regex"));

/// A declared variable name with its type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Declarator {
    pub name: SmolStr,
    pub col: usize,
    pub type_name: SmolStr,
}

/// Parse the declarations of one masked line, starting at byte `from`.
///
/// Returns nothing when the line is not a declaration.
pub(super) fn parse_declarations(line: &str, from: usize) -> Vec<Declarator> {
    let Some(text) = line.get(from..) else {
        return Vec::new();
    };
    let Some(caps) = DECL_RE.captures(text) else {
        return Vec::new();
    };
    let modifiers = caps.get(1).map_or("", |m| m.as_str());
    let old_style = modifiers
        .split_whitespace()
        .any(|m| m == "new" || m == "decl");

    let Some(rest) = caps.get(3) else {
        return Vec::new();
    };
    let (type_name, rest_start) = match caps.get(2) {
        // `new x = 1`: what looks like a type is the first declarator.
        Some(ty) if old_style => (None, ty.start()),
        Some(ty) => (Some(ty.as_str()), rest.start()),
        None => (None, rest.start()),
    };
    if type_name.is_none() && modifiers.is_empty() {
        return Vec::new();
    }
    if type_name.is_some_and(is_keyword) {
        return Vec::new();
    }

    let list = &text[rest_start..];
    let mut declarators = Vec::new();
    for (offset, part) in split_top_level(list) {
        let declarator = part.split('=').next().unwrap_or(part);
        if declarator.trim().is_empty() {
            break;
        }
        let Some(m) = DECLARATOR_RE.captures(declarator) else {
            break;
        };
        let Some(name) = m.get(2) else {
            break;
        };
        if is_keyword(name.as_str()) {
            break;
        }
        let type_name = type_name
            .or_else(|| m.get(1).map(|t| t.as_str()))
            .unwrap_or("int");
        declarators.push(Declarator {
            name: SmolStr::new(name.as_str()),
            col: from + rest_start + offset + name.start(),
            type_name: SmolStr::new(type_name),
        });
    }
    declarators
}

impl Parser<'_> {
    pub(super) fn read_globals(&mut self, n: usize) {
        let doc = self.doc;
        let declarators = parse_declarations(doc.masked_line(n), 0);
        if declarators.is_empty() {
            return;
        }
        let full_range = self.line_range(n);
        let description = self.doc_for_line(n);
        for decl in declarators {
            let range = Range::on_line(n as u32, decl.col as u32, decl.name.len() as u32);
            let item = self
                .item(&decl.name, range, ItemDetail::Variable { type_name: decl.type_name })
                .with_full_range(full_range)
                .with_description(description.clone());
            self.items.insert(decl.name, item);
        }
    }

    /// Locals declared on line `n` of the body of `function`, whose own
    /// table key is `function_key`.
    ///
    /// Locals are keyed under the callable's key, so same-named callables
    /// of different types keep apart. A name already declared on an earlier
    /// line of the body (a sibling block) gets the line appended to its key.
    pub(super) fn parse_locals(
        &mut self,
        n: usize,
        function: &SmolStr,
        function_key: &SmolStr,
        enum_struct: Option<&SmolStr>,
    ) {
        let doc = self.doc;
        let line = doc.masked_line(n);
        let from = FOR_RE.find(line).map_or(0, |m| m.end());

        for decl in parse_declarations(line, from) {
            let mut key = scoped_key(&[function_key.as_str(), decl.name.as_str()]);
            if self.items.get(&key).is_some_and(|prev| prev.range.start.line != n as u32) {
                key = SmolStr::new(format!("{key}@{n}"));
            }
            let range = Range::on_line(n as u32, decl.col as u32, decl.name.len() as u32);
            let item = self
                .item(&decl.name, range, ItemDetail::Variable { type_name: decl.type_name })
                .with_parent(Parent::Scope(function.clone()))
                .with_enum_struct(enum_struct.cloned())
                .with_full_range(self.line_range(n));
            self.items.insert(key, item);
        }
    }

    /// Fields and methods directly inside an enum struct.
    pub(super) fn parse_enum_struct_member(&mut self, n: usize, enum_struct: &SmolStr) {
        let doc = self.doc;
        let line = doc.masked_line(n);

        if let Some(header) = super::functions::FunctionHeader::parse(line) {
            let callable = super::functions::Callable::Method {
                parent: enum_struct,
                enum_struct: true,
            };
            self.read_function(n, header, callable);
            return;
        }

        self.read_enum_struct_fields(n, enum_struct, 0, line.len());
    }

    /// Fields declared between bytes `from` and `to` of line `n`, one
    /// statement after the other.
    pub(super) fn read_enum_struct_fields(&mut self, n: usize, enum_struct: &SmolStr, from: usize, to: usize) {
        let doc = self.doc;
        let line = doc.masked_line(n);
        let Some(body) = line.get(from..to) else {
            return;
        };
        // Inline fields share the line with the header and its comment.
        let description = if from == 0 { self.doc_for_line(n) } else { None };
        let mut start = from;
        for statement in body.split(';') {
            let next = start + statement.len() + 1;
            for decl in parse_declarations(&line[..to], start) {
                let range = Range::on_line(n as u32, decl.col as u32, decl.name.len() as u32);
                let item = self
                    .item(&decl.name, range, ItemDetail::Property { type_name: decl.type_name })
                    .with_parent(Parent::Scope(enum_struct.clone()))
                    .with_enum_struct(Some(enum_struct.clone()))
                    .with_full_range(self.line_range(n))
                    .with_description(description.clone());
                self.items.insert(scoped_key(&[enum_struct.as_str(), decl.name.as_str()]), item);
            }
            start = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::hir::SymbolKind;
    use crate::parser::tests::parse;

    fn names(line: &str) -> Vec<(String, String)> {
        parse_declarations(line, 0)
            .into_iter()
            .map(|d| (d.name.to_string(), d.type_name.to_string()))
            .collect()
    }

    #[rstest]
    #[case("int g_Count;", &[("g_Count", "int")])]
    #[case("float vec[3] = {1.0, 2.0, 3.0}, scale = 1.0;", &[("vec", "float"), ("scale", "float")])]
    #[case("char[] name = \"\";", &[("name", "char")])]
    #[case("new Handle:g_hTimer = INVALID_HANDLE;", &[("g_hTimer", "Handle")])]
    #[case("new count = 0;", &[("count", "int")])]
    #[case("decl String:buffer[64];", &[("buffer", "String")])]
    #[case("public Plugin myinfo = {", &[("myinfo", "Plugin")])]
    #[case("static const int MAX = 5;", &[("MAX", "int")])]
    #[case("Player p = new Player(client);", &[("p", "Player")])]
    fn test_declarations(#[case] line: &str, #[case] expected: &[(&str, &str)]) {
        let expected: Vec<_> = expected
            .iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect();
        assert_eq!(names(line), expected);
    }

    #[rstest]
    #[case("return x;")]
    #[case("x = 5;")]
    #[case("PrintToServer(\"hi\");")]
    #[case("delete h;")]
    #[case("int Foo(int a);")]
    #[case("g_Count++;")]
    #[case("case 1:")]
    fn test_not_declarations(#[case] line: &str) {
        assert!(names(line).is_empty());
    }

    #[test]
    fn test_declarator_columns() {
        let decls = parse_declarations("    int a, b[2];", 0);
        let cols: Vec<_> = decls.iter().map(|d| d.col).collect();
        assert_eq!(cols, vec![8, 11]);
    }

    #[test]
    fn test_locals_and_for_loops() {
        let items = parse(
            "void F() {\n\
             \x20   for (int i = 0; i < 3; i++) {\n\
             \x20       float f = 1.0;\n\
             \x20   }\n\
             }\n",
        );
        assert_eq!(items.get("F::i").map(|i| i.parent.clone()), Some(Parent::scope("F")));
        assert_eq!(items.get("F::f").and_then(|i| i.type_name().map(str::to_string)), Some("float".to_string()));
    }

    #[test]
    fn test_sibling_block_locals_keep_both() {
        let items = parse(
            "void F(int a) {\n\
             \x20   if (a) {\n\
             \x20       int i;\n\
             \x20   } else {\n\
             \x20       int i;\n\
             \x20   }\n\
             }\n",
        );
        assert_eq!(items.get("F::i").map(|i| i.range.start.line), Some(2));
        assert_eq!(items.get("F::i@4").map(|i| i.range.start.line), Some(4));
        assert_eq!(items.get("F::i@4").map(|i| i.parent.clone()), Some(Parent::scope("F")));
    }

    #[test]
    fn test_enum_struct_fields_and_methods() {
        let items = parse(
            "enum struct Point {\n\
             \x20   int x;\n\
             \x20   float pos[3];\n\
             \x20   int Dist(int other) {\n\
             \x20       int d = this.x - other;\n\
             \x20       return d;\n\
             \x20   }\n\
             }\n",
        );
        let x = items.get("Point::x").unwrap();
        assert_eq!(x.kind(), SymbolKind::Property);
        assert_eq!(x.parent, Parent::scope("Point"));
        assert_eq!(x.enum_struct_name.as_deref(), Some("Point"));
        assert_eq!(items.get("Point::pos").and_then(|i| i.type_name().map(str::to_string)), Some("float".to_string()));

        let dist = items.get("Point::Dist").unwrap();
        assert_eq!(dist.kind(), SymbolKind::Method);
        assert_eq!(dist.parent, Parent::scope("Point"));

        let d = items.get("Point::Dist::d").unwrap();
        assert_eq!(d.parent, Parent::scope("Dist"));
        assert_eq!(d.enum_struct_name.as_deref(), Some("Point"));
        assert!(items.get("Point::Dist::other").is_some());
        assert_eq!(items.get("Point").map(|p| p.full_range.end.line), Some(7));
    }
}
