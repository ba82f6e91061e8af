//! Go to definition.

use smol_str::SmolStr;

use crate::base::{FileUri, Position, Range};
use crate::hir::{PositionResolver, ResolveResult, SymbolKind};

/// Where a definition lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoTarget {
    pub uri: FileUri,
    /// Span of the definition's name.
    pub range: Range,
    /// Span of the whole declaration.
    pub full_range: Range,
    pub name: SmolStr,
    pub kind: SymbolKind,
}

/// Every definition the word at a position may refer to.
#[derive(Debug, Clone, Default)]
pub struct GotoResult {
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Definitions of the word at `pos`. `None` inside comments and strings.
pub fn goto_definition(resolver: &PositionResolver<'_>, pos: Position) -> Option<GotoResult> {
    let items = match resolver.resolve(pos) {
        ResolveResult::NotApplicable => return None,
        result => result.into_items(),
    };
    let targets = items
        .iter()
        .map(|item| GotoTarget {
            uri: item.file.clone(),
            range: item.range,
            full_range: item.full_range,
            name: item.name.clone(),
            kind: item.kind(),
        })
        .collect();
    Some(GotoResult { targets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::parse;
    use crate::syntax::TextDocument;

    #[test]
    fn test_goto_local_and_missing() {
        let text = "void F() {\n    int count;\n    count++;\n    missing++;\n    // count\n}\n";
        let uri = FileUri::from("file:///test.sp");
        let doc = TextDocument::new(text);
        let items: Vec<_> = parse(text).items().cloned().collect();
        let resolver = PositionResolver::new(&uri, &doc, &items);

        let result = goto_definition(&resolver, Position::new(2, 6)).unwrap();
        assert_eq!(result.targets.len(), 1);
        assert_eq!(result.targets[0].range, Range::on_line(1, 8, 5));
        assert_eq!(result.targets[0].uri, uri);

        assert!(goto_definition(&resolver, Position::new(3, 6)).unwrap().is_empty());
        assert!(goto_definition(&resolver, Position::new(4, 8)).is_none());
    }
}
