//! Document outline.
//!
//! Top-level declarations of one file, with enum members nested under their
//! enum and methods, properties and constructors nested under their type.

use smol_str::SmolStr;

use crate::base::Range;
use crate::hir::{FileItems, ItemDetail, SymbolItem, SymbolKind};

use super::hover::declaration;

/// A node of the outline tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSymbol {
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub detail: Option<String>,
    /// Whole declaration, body included.
    pub range: Range,
    /// The name.
    pub selection_range: Range,
    pub deprecated: bool,
    pub children: Vec<DocumentSymbol>,
}

impl DocumentSymbol {
    fn from_item(item: &SymbolItem, children: Vec<DocumentSymbol>) -> Self {
        let detail = match item.kind() {
            SymbolKind::Function | SymbolKind::Method | SymbolKind::Constructor | SymbolKind::Interface => {
                Some(declaration(item))
            }
            _ => item.type_name().map(str::to_string),
        };
        // A name outside its declaration's span would make the node invalid.
        let range = if item.full_range.contains(item.range.start) {
            item.full_range
        } else {
            item.range
        };
        Self {
            name: item.name.clone(),
            kind: item.kind(),
            detail,
            range,
            selection_range: item.range,
            deprecated: item.is_deprecated(),
            children,
        }
    }
}

/// Outline of `file`, in declaration order.
pub fn document_symbols(file: &FileItems) -> Vec<DocumentSymbol> {
    file.entries()
        .filter(|(_, item)| {
            item.parent.is_global() && !matches!(item.kind(), SymbolKind::EnumMember | SymbolKind::Include)
        })
        .map(|(key, item)| {
            let children = match item.kind() {
                SymbolKind::Enum => enum_members(file, key),
                SymbolKind::EnumStruct | SymbolKind::Methodmap => type_members(file, &item.name),
                _ => Vec::new(),
            };
            DocumentSymbol::from_item(item, children)
        })
        .collect()
}

fn enum_members(file: &FileItems, enum_key: &str) -> Vec<DocumentSymbol> {
    file.items()
        .filter(|i| matches!(&i.detail, ItemDetail::EnumMember { enum_key: key } if key == enum_key))
        .map(|i| DocumentSymbol::from_item(i, Vec::new()))
        .collect()
}

fn type_members(file: &FileItems, type_name: &str) -> Vec<DocumentSymbol> {
    file.items()
        .filter(|i| i.kind().is_member() && i.parent.is(type_name))
        .map(|i| DocumentSymbol::from_item(i, Vec::new()))
        .collect()
}
