//! Hover: the declaration and documentation of the word under the cursor.

use std::fmt::Write;
use std::sync::Arc;

use crate::base::{Position, Range};
use crate::hir::{ItemDetail, PositionResolver, ResolveResult, SymbolItem, SymbolKind};
use crate::syntax::DocComment;

/// Hover contents for one position.
#[derive(Debug, Clone)]
pub struct HoverResult {
    /// Markdown: fenced declaration followed by the documentation.
    pub contents: String,
    /// Span of the hovered word.
    pub range: Option<Range>,
    pub item: Arc<SymbolItem>,
}

/// Hover for `pos`, using the first match of the resolver.
pub fn hover(resolver: &PositionResolver<'_>, pos: Position) -> Option<HoverResult> {
    let item = match resolver.resolve(pos) {
        ResolveResult::Matches(items) => items.into_iter().next()?,
        ResolveResult::NoMatch | ResolveResult::NotApplicable => return None,
    };
    let range = match item.kind() {
        SymbolKind::Include => Some(item.full_range),
        _ => resolver.doc().word_range_at(pos),
    };
    Some(HoverResult {
        contents: render(&item),
        range,
        item,
    })
}

/// Markdown shown for an item.
pub fn render(item: &SymbolItem) -> String {
    let mut out = String::new();
    if let ItemDetail::Include { target } = &item.detail {
        let _ = write!(out, "`{}`\n\n{}", item.name, target);
        return out;
    }
    let _ = write!(out, "```sourcepawn\n{}\n```", declaration(item));
    if let Some(doc) = &item.description {
        render_doc(&mut out, doc);
    }
    out
}

fn render_doc(out: &mut String, doc: &DocComment) {
    if let Some(deprecated) = &doc.deprecated {
        let _ = write!(out, "\n\n**DEPRECATED**: {deprecated}");
    }
    if !doc.description.is_empty() {
        let _ = write!(out, "\n\n{}", doc.description);
    }
    for param in &doc.params {
        let _ = write!(out, "\n\n*@param* `{}` {}", param.name, param.text);
    }
    if let Some(returns) = &doc.returns {
        let _ = write!(out, "\n\n*@return* {returns}");
    }
}

/// One-line declaration of an item, as it would be written.
pub fn declaration(item: &SymbolItem) -> String {
    match &item.detail {
        ItemDetail::Define { value } if value.is_empty() => format!("#define {}", item.name),
        ItemDetail::Define { value } => format!("#define {} {}", item.name, value),
        ItemDetail::Constant => format!("const {}", item.name),
        ItemDetail::Variable { type_name } | ItemDetail::Property { type_name } => {
            let keyword = if matches!(item.detail, ItemDetail::Property { .. }) && item.enum_struct_name.is_none() {
                "property "
            } else {
                ""
            };
            format!("{keyword}{type_name} {}", item.name)
        }
        ItemDetail::Function { signature, .. }
        | ItemDetail::Method { signature, .. }
        | ItemDetail::Constructor { signature } => signature.text.clone(),
        ItemDetail::Interface { signature: Some(signature) } => signature.text.clone(),
        ItemDetail::Interface { signature: None } => format!("typeset {}", item.name),
        ItemDetail::Enum if item.name.starts_with("Enum #") => "enum".to_string(),
        ItemDetail::Enum => format!("enum {}", item.name),
        ItemDetail::EnumMember { .. } => item.name.to_string(),
        ItemDetail::EnumStruct => format!("enum struct {}", item.name),
        ItemDetail::Methodmap { inherits: Some(parent) } => format!("methodmap {} < {parent}", item.name),
        ItemDetail::Methodmap { inherits: None } => format!("methodmap {}", item.name),
        ItemDetail::Include { target } => format!("#include <{}> // {target}", item.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileUri;
    use crate::parser::tests::parse;
    use crate::syntax::TextDocument;

    #[test]
    fn test_hover_renders_signature_and_docs() {
        let text = "\
/**
 * Adds two numbers.
 *
 * @param a   First.
 * @return    The sum.
 */
int Add(int a, int b) {
    return a + b;
}
void F() {
    Add(1, 2);
}
";
        let uri = FileUri::from("file:///test.sp");
        let doc = TextDocument::new(text);
        let items: Vec<_> = parse(text).items().cloned().collect();
        let resolver = PositionResolver::new(&uri, &doc, &items);

        let result = hover(&resolver, Position::new(10, 5)).unwrap();
        assert!(result.contents.starts_with("```sourcepawn\nint Add(int a, int b)\n```"));
        assert!(result.contents.contains("Adds two numbers."));
        assert!(result.contents.contains("*@param* `a` First."));
        assert!(result.contents.contains("*@return* The sum."));
        assert_eq!(result.range, Some(Range::on_line(10, 4, 3)));

        // Parameter hover shows its own @param text.
        let param = hover(&resolver, Position::new(7, 11)).unwrap();
        assert!(param.contents.contains("int a"));
        assert!(param.contents.contains("First."));
    }

    #[test]
    fn test_no_hover_in_comment() {
        let text = "int x; // x\n";
        let uri = FileUri::from("file:///test.sp");
        let doc = TextDocument::new(text);
        let items: Vec<_> = parse(text).items().cloned().collect();
        let resolver = PositionResolver::new(&uri, &doc, &items);
        assert!(hover(&resolver, Position::new(0, 10)).is_none());
        assert!(hover(&resolver, Position::new(0, 4)).is_some());
    }

    #[test]
    fn test_declarations() {
        let items = parse("#define MAX 10\nmethodmap Derived < Base {\n}\nenum { A }\n");
        assert_eq!(declaration(items.get("MAX").unwrap()), "#define MAX 10");
        assert_eq!(declaration(items.get("Derived").unwrap()), "methodmap Derived < Base");
        let anon = items.items().find(|i| i.kind() == SymbolKind::Enum).unwrap();
        assert_eq!(declaration(anon), "enum");
    }
}
