//! Per-file symbol tables.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::{FileUri, Range};

use super::symbols::SymbolItem;

/// One `#include` / `#tryinclude` directive of a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeRecord {
    /// The path as written, with the default extension applied.
    pub path: SmolStr,
    /// Resolved file, `None` when no include folder contains it.
    pub target: Option<FileUri>,
    /// Span of the path text.
    pub range: Range,
    /// `#tryinclude`: a missing target is expected.
    pub optional: bool,
}

/// A use of a `#define`d name recorded while parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MacroUse {
    pub name: SmolStr,
    pub range: Range,
}

/// Symbol table of one parsed file.
///
/// Items keep their first insertion position; inserting an existing key
/// replaces the item (last write wins). A table is built once per parse and
/// then only read; a re-parse produces a new table.
#[derive(Clone, Debug)]
pub struct FileItems {
    uri: FileUri,
    items: IndexMap<SmolStr, Arc<SymbolItem>>,
    includes: Vec<IncludeRecord>,
    macro_uses: Vec<MacroUse>,
}

impl FileItems {
    pub fn new(uri: FileUri) -> Self {
        Self {
            uri,
            items: IndexMap::new(),
            includes: Vec::new(),
            macro_uses: Vec::new(),
        }
    }

    pub fn uri(&self) -> &FileUri {
        &self.uri
    }

    /// Insert `item` under `key`, returning the item it replaced.
    pub fn insert(&mut self, key: impl Into<SmolStr>, item: SymbolItem) -> Option<Arc<SymbolItem>> {
        self.items.insert(key.into(), Arc::new(item))
    }

    pub fn get(&self, key: &str) -> Option<&Arc<SymbolItem>> {
        self.items.get(key)
    }

    /// Mutable access while the table is still being built.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut SymbolItem> {
        self.items.get_mut(key).map(Arc::make_mut)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<SymbolItem>> {
        self.items.values()
    }

    /// `(key, item)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Arc<SymbolItem>)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_include(&mut self, include: IncludeRecord) {
        self.includes.push(include);
    }

    /// Include directives in source order.
    pub fn includes(&self) -> &[IncludeRecord] {
        &self.includes
    }

    /// Resolved include targets in source order.
    pub fn include_targets(&self) -> impl Iterator<Item = &FileUri> {
        self.includes.iter().filter_map(|inc| inc.target.as_ref())
    }

    pub fn push_macro_use(&mut self, name: impl Into<SmolStr>, range: Range) {
        let name = name.into();
        let entry = MacroUse { name, range };
        if !self.macro_uses.contains(&entry) {
            self.macro_uses.push(entry);
        }
    }

    pub fn macro_uses(&self) -> &[MacroUse] {
        &self.macro_uses
    }

    /// Whether `self` and `other` hold the same declarations in the same
    /// order, ignoring accumulated references.
    pub fn same_declarations(&self, other: &FileItems) -> bool {
        self.uri == other.uri
            && self.includes == other.includes
            && self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(other.items.iter())
                .all(|((ka, a), (kb, b))| ka == kb && a.same_declaration(b))
    }
}
