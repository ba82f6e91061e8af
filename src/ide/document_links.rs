//! Document links: clickable `#include` paths.

use std::borrow::Cow;

use crate::base::{FileUri, Range};
use crate::hir::FileItems;

/// A document link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    /// The span of the include path in the source file.
    pub range: Range,
    /// The included file.
    pub target: FileUri,
    /// Tooltip text for the link.
    pub tooltip: Cow<'static, str>,
}

/// Get document links for a file.
///
/// Includes that did not resolve to a file produce no link.
pub fn document_links(file: &FileItems) -> Vec<DocumentLink> {
    file.includes()
        .iter()
        .filter_map(|include| {
            let target = include.target.clone()?;
            Some(DocumentLink {
                range: include.range,
                tooltip: Cow::Owned(format!("Open {}", include.path)),
                target,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::EngineConfig;
    use crate::parser::parse_file;
    use crate::project::MemoryIncludeResolver;
    use crate::syntax::TextDocument;

    #[test]
    fn test_links_for_resolved_includes() {
        let resolver = MemoryIncludeResolver::new().with_file("/proj/include/util.inc");
        let uri = FileUri::from_path(Path::new("/proj/plugin.sp"));
        let doc = TextDocument::new("#include \"util\"\n#include <missing>\n");
        let items = parse_file(&uri, &doc, &resolver, &EngineConfig::default());

        let links = document_links(&items);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, FileUri::from_path(Path::new("/proj/include/util.inc")));
        assert_eq!(links[0].range, Range::on_line(0, 10, 4));
        assert_eq!(links[0].tooltip, "Open util.inc");
    }
}
