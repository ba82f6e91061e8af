//! Code completion.
//!
//! After `recv.` the members of the receiver's type and its ancestors are
//! offered. Elsewhere every global item is offered, preceded by the locals
//! of the enclosing function and the members of the enclosing type.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::{Position, Range};
use crate::hir::{
    ItemDetail, PositionResolver, SymbolItem, SymbolKind, expand_inheritance, infer_receiver_type, members_of,
};
use crate::hir::types::accessor_before;

use super::hover::declaration;

/// A completion entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: SmolStr,
    pub kind: SymbolKind,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub deprecated: bool,
}

impl CompletionItem {
    pub fn from_item(item: &SymbolItem) -> Self {
        let detail = match &item.detail {
            ItemDetail::EnumMember { enum_key } => Some(format!("{} ({enum_key})", item.name)),
            _ => Some(declaration(item)),
        };
        Self {
            label: item.name.clone(),
            kind: item.kind(),
            detail,
            documentation: item
                .description
                .as_ref()
                .map(|d| d.description.clone())
                .filter(|d| !d.is_empty()),
            deprecated: item.is_deprecated(),
        }
    }
}

/// Completions at `pos`. `None` inside comments and strings.
pub fn completions(resolver: &PositionResolver<'_>, pos: Position) -> Option<Vec<CompletionItem>> {
    let doc = resolver.doc();
    if doc.is_in_comment(pos) || doc.is_in_string(pos) {
        return None;
    }
    let items = resolver.items();
    let scope = resolver.scope_at(pos);

    // Start of the word being typed, or the cursor itself.
    let start = doc.word_range_at(pos).map_or(pos, |r| r.start);
    let line = doc.masked_line(pos.line as usize);

    if accessor_before(line, start.col as usize).is_some() {
        let word = Range::new(start, start);
        let Some(ty) = infer_receiver_type(doc, items, &scope, word) else {
            return Some(Vec::new());
        };
        let chain = expand_inheritance(&ty, items);
        return Some(dedup(members_of(items, &chain).iter().map(|m| &**m)));
    }

    let locals = items.iter().filter(|i| scope.is_local(i));
    let members = items.iter().filter(|i| scope.is_own_member(i));
    let globals = items.iter().filter(|i| {
        (i.parent.is_global() || i.kind() == SymbolKind::EnumMember)
            && !i.kind().is_member()
            && i.kind() != SymbolKind::Include
    });
    Some(dedup(locals.chain(members).chain(globals).map(|i| &**i)))
}

/// One entry per name, first occurrence wins.
fn dedup<'i>(items: impl Iterator<Item = &'i SymbolItem>) -> Vec<CompletionItem> {
    let mut seen = FxHashSet::default();
    items
        .filter(|i| seen.insert(i.name.clone()))
        .map(CompletionItem::from_item)
        .collect()
}
