//! Function, method and constructor declarations.
//!
//! A declaration's parameter list may span several lines; it is read up to
//! the matching `)`. Declarations followed by a body open a `Function`
//! context and register their parameters as locals of that function.

use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

use crate::base::{Position, Range};
use crate::hir::{Definition, ItemDetail, Parameter, Parent, Signature, Visibility};
use crate::syntax::{DocComment, doc_comment_before};

use super::{Parser, State, collapse_whitespace, identifiers, is_keyword, scoped_key, split_top_level};

static FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*((?:(?:public|stock|static|native|forward)\s+)*)(?:([A-Za-z_][A-Za-z0-9_]*)(?:\s*\[\s*\])*\s+|([A-Za-z_][A-Za-z0-9_]*)\s*:\s*)?([A-Za-z_][A-Za-z0-9_]*)\s*\(",
    )
    .expect("invalid function regex")
});

/// The part of a declaration line up to its opening parenthesis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct FunctionHeader<'t> {
    pub modifiers: Vec<&'t str>,
    pub return_type: Option<&'t str>,
    pub name: &'t str,
    pub name_col: usize,
    pub paren_col: usize,
}

impl<'t> FunctionHeader<'t> {
    /// Match a free function or enum struct method header.
    pub fn parse(line: &'t str) -> Option<Self> {
        let caps = FUNCTION_RE.captures(line)?;
        let name = caps.get(4)?;
        let return_type = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
        if is_keyword(name.as_str()) || return_type.is_some_and(is_keyword) {
            return None;
        }
        Some(Self {
            modifiers: caps.get(1).map_or_else(Vec::new, |m| m.as_str().split_whitespace().collect()),
            return_type,
            name: name.as_str(),
            name_col: name.start(),
            paren_col: caps.get(0)?.end() - 1,
        })
    }

    fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| *m == modifier)
    }
}

/// What a function header declares.
#[derive(Clone, Copy, Debug)]
pub(super) enum Callable<'s> {
    Function,
    Method {
        parent: &'s str,
        enum_struct: bool,
    },
    Constructor {
        parent: &'s str,
    },
}

/// A parameter list read from the document.
#[derive(Clone, Debug)]
pub(super) struct SignatureSpan {
    /// Position of the closing parenthesis.
    pub close: Position,
    /// Last line the declaration occupies.
    pub end_line: usize,
    pub params: Vec<ParamSpan>,
    /// Whether a `{` body follows.
    pub has_body: bool,
}

#[derive(Clone, Debug)]
pub(super) struct ParamSpan {
    pub param: Parameter,
    pub name_range: Option<Range>,
}

impl Parser<'_> {
    pub(super) fn read_function(&mut self, n: usize, header: FunctionHeader<'_>, callable: Callable<'_>) {
        let Some(span) = self.read_signature(n, header.paren_col) else {
            return;
        };
        let doc = self.doc;
        let start = self.line_range(n).start;
        let signature = self.signature(start, &span, header.return_type.unwrap_or(""));

        let (detail, key, parent, enum_struct) = match callable {
            Callable::Function => {
                let visibility = header
                    .modifiers
                    .iter()
                    .filter_map(|m| match *m {
                        "public" => Some(Visibility::Public),
                        "stock" => Some(Visibility::Stock),
                        "static" => Some(Visibility::Static),
                        _ => None,
                    })
                    .collect();
                let definition = if header.has_modifier("native") {
                    Definition::Native
                } else if header.has_modifier("forward") {
                    Definition::Forward
                } else {
                    Definition::Body
                };
                let detail = ItemDetail::Function {
                    signature,
                    visibility,
                    definition,
                };
                (detail, SmolStr::new(header.name), Parent::Global, None)
            }
            Callable::Method { parent, enum_struct } => {
                let detail = ItemDetail::Method {
                    signature,
                    is_static: header.has_modifier("static"),
                };
                let owner = enum_struct.then(|| SmolStr::new(parent));
                (detail, scoped_key(&[parent, header.name]), Parent::scope(parent), owner)
            }
            Callable::Constructor { parent } => (
                ItemDetail::Constructor { signature },
                scoped_key(&[parent, header.name]),
                Parent::scope(parent),
                None,
            ),
        };

        let end = if span.has_body {
            Position::new(span.close.line, span.close.col + 1)
        } else {
            self.line_range(span.end_line).end
        };
        let description = doc_comment_before(doc, n as u32);
        let range = Range::on_line(n as u32, header.name_col as u32, header.name.len() as u32);
        let item = self
            .item(header.name, range, detail)
            .with_parent(parent)
            .with_enum_struct(enum_struct.clone())
            .with_full_range(Range::new(start, end))
            .with_description(description.clone());
        self.items.insert(key.clone(), item);
        self.line_nb = span.end_line;

        if !span.has_body {
            return;
        }

        let name = SmolStr::new(header.name);
        for param in span.params {
            let Some(range) = param.name_range else {
                continue;
            };
            let param_doc = description
                .as_ref()
                .and_then(|d| d.param(&param.param.name))
                .map(|text| DocComment {
                    description: text.to_string(),
                    ..DocComment::default()
                });
            let local_key = scoped_key(&[key.as_str(), param.param.name.as_str()]);
            let local = self
                .item(
                    &param.param.name,
                    range,
                    ItemDetail::Variable { type_name: param.param.type_name },
                )
                .with_parent(Parent::Scope(name.clone()))
                .with_enum_struct(enum_struct.clone())
                .with_description(param_doc);
            self.items.insert(local_key, local);
        }

        self.states.push(State::Function {
            name,
            key,
            enum_struct,
        });
    }

    /// Read the parameter list opening at column `paren` of line `n`.
    ///
    /// Returns `None` when no matching `)` is found within the ceiling or
    /// before the end of the file.
    pub(super) fn read_signature(&self, n: usize, paren: usize) -> Option<SignatureSpan> {
        let doc = self.doc;
        let last = (n + self.config.enum_member_ceiling).min(doc.line_count().saturating_sub(1));

        // Parameter text with the position each line's slice starts at.
        let mut text = String::new();
        let mut segments: Vec<(usize, Position)> = Vec::new();
        let mut depth = 0u32;
        let mut close = None;

        for line_nb in n..=last {
            let masked = doc.masked_line(line_nb);
            let from = if line_nb == n { paren + 1 } else { 0 };
            let rest = masked.get(from..)?;
            let mut end = rest.len();
            for (idx, b) in rest.bytes().enumerate() {
                match b {
                    b'(' => depth += 1,
                    b')' if depth == 0 => {
                        end = idx;
                        close = Some(Position::new(line_nb as u32, (from + idx) as u32));
                        break;
                    }
                    b')' => depth -= 1,
                    _ => {}
                }
            }
            segments.push((text.len(), Position::new(line_nb as u32, from as u32)));
            text.push_str(&rest[..end]);
            if close.is_some() {
                break;
            }
            text.push('\n');
        }
        let close = close?;
        let end_line = close.line as usize;

        let after = doc
            .masked_line(end_line)
            .get(close.col as usize + 1..)
            .unwrap_or("")
            .trim_start();
        let has_body = if after.starts_with('{') {
            true
        } else if after.is_empty() {
            (end_line + 1..doc.line_count())
                .map(|l| doc.masked_line(l).trim_start())
                .find(|l| !l.is_empty())
                .is_some_and(|l| l.starts_with('{'))
        } else {
            false
        };

        let position_of = |offset: usize| -> Position {
            let idx = segments.partition_point(|(start, _)| *start <= offset).saturating_sub(1);
            let (start, pos) = segments[idx];
            Position::new(pos.line, pos.col + (offset - start) as u32)
        };

        let params = split_top_level(&text)
            .into_iter()
            .filter_map(|(offset, part)| {
                let parsed = parse_param(part)?;
                let trimmed_start = offset + (part.len() - part.trim_start().len());
                let trimmed_end = offset + part.trim_end().len();
                let written = doc.text_without_comments(Range::new(
                    position_of(trimmed_start),
                    position_of(trimmed_end),
                ));
                let name_range = parsed.name_offset.map(|off| {
                    let pos = position_of(offset + off);
                    Range::on_line(pos.line, pos.col, parsed.name.len() as u32)
                });
                Some(ParamSpan {
                    param: Parameter {
                        name: parsed.name,
                        type_name: parsed.type_name,
                        text: SmolStr::from(collapse_whitespace(&written)),
                    },
                    name_range,
                })
            })
            .collect();

        Some(SignatureSpan {
            close,
            end_line,
            params,
            has_body,
        })
    }

    /// Build the signature of a declaration starting at `start`.
    pub(super) fn signature(&self, start: Position, span: &SignatureSpan, return_type: &str) -> Signature {
        let end = Position::new(span.close.line, span.close.col + 1);
        let text = self.doc.text_without_comments(Range::new(start, end));
        Signature {
            return_type: SmolStr::new(return_type),
            params: span.params.iter().map(|p| p.param.clone()).collect(),
            text: collapse_whitespace(&text),
        }
    }
}

struct ParsedParam {
    name: SmolStr,
    /// Byte offset of the name within the parameter text.
    name_offset: Option<usize>,
    type_name: SmolStr,
}

/// Parse one parameter declaration: `const char[] name = "x"`,
/// `Float:vec[3]`, `int &out`, `any ...`.
fn parse_param(part: &str) -> Option<ParsedParam> {
    let decl = part.split('=').next().unwrap_or(part);
    if decl.trim().is_empty() {
        return None;
    }

    // Blank out array dimensions so sizes are not taken for names.
    let mut cleaned = String::with_capacity(decl.len());
    let mut in_brackets = 0u32;
    for c in decl.chars() {
        match c {
            '[' => {
                in_brackets += 1;
                cleaned.push(c);
            }
            ']' => {
                in_brackets = in_brackets.saturating_sub(1);
                cleaned.push(c);
            }
            _ if in_brackets > 0 => cleaned.push_str(&" ".repeat(c.len_utf8())),
            _ => cleaned.push(c),
        }
    }

    let mut tag = None;
    let mut words = Vec::new();
    for (offset, word) in identifiers(&cleaned) {
        if word == "const" {
            continue;
        }
        let is_tag = cleaned[offset + word.len()..].trim_start().starts_with(':');
        if is_tag {
            tag = Some(word);
        } else {
            words.push((offset, word));
        }
    }

    if cleaned.contains("...") {
        let type_name = tag.or_else(|| words.first().map(|(_, w)| *w)).unwrap_or("any");
        return Some(ParsedParam {
            name: SmolStr::new_inline("..."),
            name_offset: None,
            type_name: SmolStr::new(type_name),
        });
    }

    let (name_offset, name) = *words.last()?;
    let type_name = tag
        .or_else(|| words.len().checked_sub(2).map(|idx| words[idx].1))
        .unwrap_or("int");
    Some(ParsedParam {
        name: SmolStr::new(name),
        name_offset: Some(name_offset),
        type_name: SmolStr::new(type_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::SymbolKind;
    use crate::parser::tests::parse;

    #[test]
    fn test_header_forms() {
        let header = FunctionHeader::parse("public void OnPluginStart()").unwrap();
        assert_eq!(header.modifiers, vec!["public"]);
        assert_eq!(header.return_type, Some("void"));
        assert_eq!(header.name, "OnPluginStart");
        assert_eq!(header.paren_col, 25);

        let old = FunctionHeader::parse("public Action:Timer_Tick(Handle:timer)").unwrap();
        assert_eq!(old.return_type, Some("Action"));
        assert_eq!(old.name, "Timer_Tick");

        let array = FunctionHeader::parse("stock char[] Name(int i)").unwrap();
        assert_eq!(array.return_type, Some("char"));

        assert!(FunctionHeader::parse("    if (x) {").is_none());
        assert!(FunctionHeader::parse("    return Foo(x);").is_none());
        assert!(FunctionHeader::parse("int x = Foo(1);").is_none());
    }

    #[test]
    fn test_parse_param() {
        let p = parse_param(" const char[] name = \"x\"").unwrap();
        assert_eq!((p.name.as_str(), p.type_name.as_str()), ("name", "char"));
        assert_eq!(p.name_offset, Some(14));

        let p = parse_param("Float:vec[MAXPLAYERS + 1]").unwrap();
        assert_eq!((p.name.as_str(), p.type_name.as_str()), ("vec", "Float"));

        let p = parse_param("int &out").unwrap();
        assert_eq!((p.name.as_str(), p.type_name.as_str()), ("out", "int"));

        let p = parse_param("client").unwrap();
        assert_eq!((p.name.as_str(), p.type_name.as_str()), ("client", "int"));

        let p = parse_param(" any ...").unwrap();
        assert_eq!((p.name.as_str(), p.type_name.as_str(), p.name_offset), ("...", "any", None));

        assert!(parse_param("   ").is_none());
    }

    #[test]
    fn test_multiline_signature() {
        let items = parse(
            "/**\n * Adds.\n * @param a  First\n */\n\
             stock int Add(int a, // first\n\
             \x20             int b = 2)\n\
             {\n\
             \x20   return a + b;\n\
             }\n",
        );
        let add = items.get("Add").unwrap();
        let signature = add.signature().unwrap();
        assert_eq!(signature.return_type, "int");
        assert_eq!(signature.text, "stock int Add(int a, int b = 2)");
        let texts: Vec<_> = signature.params.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["int a", "int b = 2"]);
        assert_eq!(add.full_range.end, Position::new(8, 1));

        let a = items.get("Add::a").unwrap();
        assert_eq!(a.parent, Parent::scope("Add"));
        assert_eq!(a.range, Range::on_line(4, 18, 1));
        assert_eq!(a.description.as_ref().map(|d| d.description.as_str()), Some("First"));
        let b = items.get("Add::b").unwrap();
        assert_eq!(b.range, Range::on_line(5, 18, 1));
    }

    #[test]
    fn test_natives_and_forwards_have_no_body() {
        let items = parse(
            "native int GetClientHealth(int client);\n\
             forward void OnClientPutInServer(int client);\n\
             int after;\n",
        );
        match &items.get("GetClientHealth").unwrap().detail {
            ItemDetail::Function { definition, .. } => assert_eq!(*definition, Definition::Native),
            other => panic!("unexpected {other:?}"),
        }
        match &items.get("OnClientPutInServer").unwrap().detail {
            ItemDetail::Function { definition, .. } => assert_eq!(*definition, Definition::Forward),
            other => panic!("unexpected {other:?}"),
        }
        // Prototype parameters are not locals.
        assert!(items.get("GetClientHealth::client").is_none());
        assert_eq!(items.get("after").map(|i| i.kind()), Some(SymbolKind::Variable));
    }

    #[test]
    fn test_old_style_function() {
        let items = parse("public OnPluginStart()\n{\n    new count = 0;\n}\n");
        let f = items.get("OnPluginStart").unwrap();
        match &f.detail {
            ItemDetail::Function { visibility, signature, .. } => {
                assert_eq!(visibility, &vec![Visibility::Public]);
                assert_eq!(signature.return_type, "");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(items.get("OnPluginStart::count").map(|i| i.parent.clone()), Some(Parent::scope("OnPluginStart")));
    }
}
