//! Find references.

use crate::base::{Location, Position};
use crate::hir::{PositionResolver, ResolveResult};

/// Uses of the declarations the word at `pos` refers to, in the order
/// they were recorded. `None` inside comments and strings.
pub fn find_references(
    resolver: &PositionResolver<'_>,
    pos: Position,
    include_declaration: bool,
) -> Option<Vec<Location>> {
    let items = match resolver.resolve(pos) {
        ResolveResult::NotApplicable => return None,
        result => result.into_items(),
    };
    let mut locations = Vec::new();
    for item in &items {
        if include_declaration {
            locations.push(item.location());
        }
        for location in item.references.snapshot() {
            if !locations.contains(&location) {
                locations.push(location);
            }
        }
    }
    Some(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileUri, Range};
    use crate::config::EngineConfig;
    use crate::hir::{ItemsRepository, collect_references};
    use crate::parser::parse_file;
    use crate::project::MemoryIncludeResolver;
    use crate::syntax::TextDocument;

    #[test]
    fn test_find_references() {
        let text = "int hits;\nvoid F() {\n    hits++;\n    hits = 0;\n}\n";
        let uri = FileUri::from("file:///test.sp");
        let doc = TextDocument::new(text);
        let repo = ItemsRepository::default();
        repo.set_file_items(parse_file(&uri, &doc, &MemoryIncludeResolver::new(), &EngineConfig::default()));
        collect_references(&repo, &uri, &doc);

        let items = repo.get_all_items(&uri);
        let resolver = PositionResolver::new(&uri, &doc, &items);
        let refs = find_references(&resolver, Position::new(2, 5), false).unwrap();
        let ranges: Vec<_> = refs.iter().map(|l| l.range).collect();
        assert_eq!(ranges, vec![Range::on_line(2, 4, 4), Range::on_line(3, 4, 4)]);

        let with_decl = find_references(&resolver, Position::new(0, 5), true).unwrap();
        assert_eq!(with_decl.len(), 3);
        assert_eq!(with_decl[0].range, Range::on_line(0, 4, 4));
    }
}
