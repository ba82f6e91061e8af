//! Reference collection.
//!
//! After a file is parsed and installed, every identifier in it is resolved
//! and a [`Location`] appended to each declaration it names. References from
//! a previous version of the file are purged first, from every stored item,
//! so the lists never hold stale locations.

use crate::base::{FileUri, Location};
use crate::parser::is_keyword;
use crate::syntax::TextDocument;

use super::repository::ItemsRepository;
use super::resolve::PositionResolver;
use super::symbols::ItemDetail;

/// Drop every reference located in `uri` from all stored items.
pub fn purge_references(repository: &ItemsRepository, uri: &FileUri) {
    for file in repository.files() {
        if let Some(table) = repository.file_items(&file) {
            for item in table.items() {
                item.references.purge(uri);
            }
        }
    }
}

/// Re-collect the references made by `doc`, the current text of `uri`.
///
/// Returns the number of references recorded.
pub fn collect_references(repository: &ItemsRepository, uri: &FileUri, doc: &TextDocument) -> usize {
    purge_references(repository, uri);

    let items = repository.get_all_items(uri);
    let resolver = PositionResolver::new(uri, doc, &items);
    let mut count = 0;

    for (range, _) in doc.identifiers() {
        if is_keyword(doc.get_text(range)) {
            continue;
        }
        for item in resolver.resolve_word(range) {
            // The declaration itself is not a use.
            if &item.file == uri && item.range == range {
                continue;
            }
            item.references.push(Location::new(uri.clone(), range));
            count += 1;
        }
    }

    // Expansion sites of defines, including uses inside other defines.
    if let Some(table) = repository.file_items(uri) {
        for macro_use in table.macro_uses() {
            let defines = items.iter().filter(|i| {
                i.name == macro_use.name && matches!(i.detail, ItemDetail::Define { .. })
            });
            for define in defines {
                define.references.push(Location::new(uri.clone(), macro_use.range));
            }
        }
    }

    tracing::debug!(uri = %uri, references = count, "collected references");
    count
}
