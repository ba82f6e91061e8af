//! Symbol items: the records produced by the line parser.
//!
//! Every declaration the parser recognises becomes one [`SymbolItem`]. The
//! common fields (name, file, ranges, parent scope, documentation) live on
//! the item itself; kind-specific data lives in [`ItemDetail`], which also
//! determines the item's [`SymbolKind`].

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use smol_str::SmolStr;

use crate::base::{FileUri, Location, Range};
use crate::syntax::DocComment;

/// Textual form of [`Parent::Global`], reserved and never a user identifier.
pub const GLOBAL_IDENTIFIER: &str = "$GLOBAL";

// ============================================================================
// KINDS & SCOPES
// ============================================================================

/// The kind of a symbol item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Constant,
    Variable,
    Function,
    Enum,
    EnumMember,
    EnumStruct,
    Methodmap,
    Method,
    Property,
    Constructor,
    Include,
    Interface,
}

impl SymbolKind {
    /// Methods, properties and constructors: items reached through a type.
    pub fn is_member(self) -> bool {
        matches!(
            self,
            SymbolKind::Method | SymbolKind::Property | SymbolKind::Constructor
        )
    }

    /// Members plus free functions.
    pub fn is_member_or_function(self) -> bool {
        self.is_member() || self == SymbolKind::Function
    }

    /// Kinds that can be invoked with `name(...)` outside of a type.
    pub fn is_free_callable(self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Interface)
    }

    /// Kinds that own members and can be a receiver's type.
    pub fn is_container(self) -> bool {
        matches!(self, SymbolKind::EnumStruct | SymbolKind::Methodmap)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Constant => "constant",
            SymbolKind::Variable => "variable",
            SymbolKind::Function => "function",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumMember => "enum member",
            SymbolKind::EnumStruct => "enum struct",
            SymbolKind::Methodmap => "methodmap",
            SymbolKind::Method => "method",
            SymbolKind::Property => "property",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Include => "include",
            SymbolKind::Interface => "interface",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scope an item is nested in.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub enum Parent {
    /// Not nested in any function, enum struct or methodmap.
    #[default]
    Global,
    /// Name of the enclosing function, method, enum struct or methodmap.
    Scope(SmolStr),
}

impl Parent {
    pub fn scope(name: impl Into<SmolStr>) -> Self {
        Parent::Scope(name.into())
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Parent::Global)
    }

    /// The scope name, `None` for global.
    pub fn name(&self) -> Option<&str> {
        match self {
            Parent::Global => None,
            Parent::Scope(name) => Some(name),
        }
    }

    /// Whether this parent is the scope called `name`.
    pub fn is(&self, name: &str) -> bool {
        self.name() == Some(name)
    }

    pub fn as_str(&self) -> &str {
        self.name().unwrap_or(GLOBAL_IDENTIFIER)
    }
}

impl fmt::Debug for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// KIND-SPECIFIC DATA
// ============================================================================

/// One declared parameter of a callable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: SmolStr,
    /// Declared type, without array brackets or `const`/`&` decorations.
    pub type_name: SmolStr,
    /// The declaration as written (`const char[] name`).
    pub text: SmolStr,
}

/// Shape of a callable declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signature {
    pub return_type: SmolStr,
    pub params: Vec<Parameter>,
    /// Whole declaration head as written, normalized to one line.
    pub text: String,
}

/// Storage/linkage keywords attached to a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Stock,
    Static,
}

/// How a function is provided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Definition {
    /// Has a body in this file.
    #[default]
    Body,
    /// `native` declaration implemented by the host.
    Native,
    /// `forward` declaration implemented by plugins.
    Forward,
}

/// Kind-specific fields of a symbol item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemDetail {
    /// `#define NAME value`
    Define { value: SmolStr },
    Constant,
    Variable { type_name: SmolStr },
    Function {
        signature: Signature,
        visibility: Vec<Visibility>,
        definition: Definition,
    },
    /// `typedef`, `typeset` and `functag` declarations.
    Interface { signature: Option<Signature> },
    Enum,
    /// Back-reference to the owning enum by its table key.
    EnumMember { enum_key: SmolStr },
    EnumStruct,
    Methodmap { inherits: Option<SmolStr> },
    Method { signature: Signature, is_static: bool },
    Constructor { signature: Signature },
    Property { type_name: SmolStr },
    /// A resolved `#include`, pointing at the target file.
    Include { target: FileUri },
}

impl ItemDetail {
    pub fn kind(&self) -> SymbolKind {
        match self {
            ItemDetail::Define { .. } | ItemDetail::Constant => SymbolKind::Constant,
            ItemDetail::Variable { .. } => SymbolKind::Variable,
            ItemDetail::Function { .. } => SymbolKind::Function,
            ItemDetail::Interface { .. } => SymbolKind::Interface,
            ItemDetail::Enum => SymbolKind::Enum,
            ItemDetail::EnumMember { .. } => SymbolKind::EnumMember,
            ItemDetail::EnumStruct => SymbolKind::EnumStruct,
            ItemDetail::Methodmap { .. } => SymbolKind::Methodmap,
            ItemDetail::Method { .. } => SymbolKind::Method,
            ItemDetail::Constructor { .. } => SymbolKind::Constructor,
            ItemDetail::Property { .. } => SymbolKind::Property,
            ItemDetail::Include { .. } => SymbolKind::Include,
        }
    }
}

// ============================================================================
// REFERENCES
// ============================================================================

/// Locations where a symbol is used.
///
/// Shared between clones of an item so the reference pass of one file can
/// append to items owned by another file's table. Entries are only purged
/// per referencing file; a re-parse of the defining file starts a fresh list.
#[derive(Clone, Default)]
pub struct References(Arc<RwLock<Vec<Location>>>);

impl References {
    pub fn push(&self, location: Location) {
        let mut refs = self.0.write();
        if !refs.contains(&location) {
            refs.push(location);
        }
    }

    /// Drop every reference located in `uri`.
    pub fn purge(&self, uri: &FileUri) {
        self.0.write().retain(|loc| &loc.uri != uri);
    }

    /// Copy of the current references, in insertion order.
    pub fn snapshot(&self) -> Vec<Location> {
        self.0.read().clone()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

impl fmt::Debug for References {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "References({})", self.len())
    }
}

// ============================================================================
// SYMBOL ITEM
// ============================================================================

/// A parsed declaration.
#[derive(Clone, Debug)]
pub struct SymbolItem {
    pub name: SmolStr,
    /// File the item is declared in.
    pub file: FileUri,
    /// Span of the name token.
    pub range: Range,
    /// Span of the whole declaration, used for outlines and scope lookup.
    pub full_range: Range,
    pub description: Option<DocComment>,
    pub parent: Parent,
    /// Enum struct the item is declared in, when there is one.
    pub enum_struct_name: Option<SmolStr>,
    pub detail: ItemDetail,
    pub references: References,
}

impl SymbolItem {
    /// A global item whose full range is its name range.
    pub fn new(name: impl Into<SmolStr>, file: FileUri, range: Range, detail: ItemDetail) -> Self {
        Self {
            name: name.into(),
            file,
            range,
            full_range: range,
            description: None,
            parent: Parent::Global,
            enum_struct_name: None,
            detail,
            references: References::default(),
        }
    }

    pub fn with_parent(mut self, parent: Parent) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_enum_struct(mut self, name: Option<SmolStr>) -> Self {
        self.enum_struct_name = name;
        self
    }

    pub fn with_full_range(mut self, range: Range) -> Self {
        self.full_range = range;
        self
    }

    pub fn with_description(mut self, description: Option<DocComment>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }

    #[inline]
    pub fn kind(&self) -> SymbolKind {
        self.detail.kind()
    }

    pub fn location(&self) -> Location {
        Location::new(self.file.clone(), self.range)
    }

    /// The type a receiver of this item evaluates to: declared type of a
    /// variable or property, return type of a callable.
    pub fn type_name(&self) -> Option<&str> {
        let ty = match &self.detail {
            ItemDetail::Variable { type_name } | ItemDetail::Property { type_name } => type_name,
            ItemDetail::Function { signature, .. } | ItemDetail::Method { signature, .. } => {
                &signature.return_type
            }
            // A constructor call evaluates to its methodmap.
            ItemDetail::Constructor { .. } => &self.name,
            _ => return None,
        };
        (!ty.is_empty()).then_some(ty.as_str())
    }

    pub fn signature(&self) -> Option<&Signature> {
        match &self.detail {
            ItemDetail::Function { signature, .. }
            | ItemDetail::Method { signature, .. }
            | ItemDetail::Constructor { signature } => Some(signature),
            ItemDetail::Interface { signature } => signature.as_ref(),
            _ => None,
        }
    }

    /// Parent type of a methodmap.
    pub fn inherits(&self) -> Option<&str> {
        match &self.detail {
            ItemDetail::Methodmap { inherits } => inherits.as_deref(),
            _ => None,
        }
    }

    pub fn include_target(&self) -> Option<&FileUri> {
        match &self.detail {
            ItemDetail::Include { target } => Some(target),
            _ => None,
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.description
            .as_ref()
            .is_some_and(|d| d.deprecated.is_some())
    }

    /// Whether this item and `other` describe the same declaration.
    ///
    /// References are accumulated state and do not take part.
    pub fn same_declaration(&self, other: &SymbolItem) -> bool {
        self.name == other.name
            && self.file == other.file
            && self.range == other.range
            && self.full_range == other.full_range
            && self.parent == other.parent
            && self.enum_struct_name == other.enum_struct_name
            && self.detail == other.detail
            && self.description == other.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Position;

    fn uri() -> FileUri {
        FileUri::from("file:///test.sp")
    }

    #[test]
    fn test_kind_follows_detail() {
        let define = SymbolItem::new(
            "MAXPLAYERS",
            uri(),
            Range::on_line(0, 8, 10),
            ItemDetail::Define { value: "65".into() },
        );
        assert_eq!(define.kind(), SymbolKind::Constant);

        let ctor = SymbolItem::new(
            "Player",
            uri(),
            Range::on_line(2, 11, 6),
            ItemDetail::Constructor { signature: Signature::default() },
        )
        .with_parent(Parent::scope("Player"));
        assert_eq!(ctor.kind(), SymbolKind::Constructor);
        assert!(ctor.kind().is_member());
        assert_eq!(ctor.type_name(), Some("Player"));
    }

    #[test]
    fn test_parent_sentinel() {
        assert!(Parent::Global.is_global());
        assert_eq!(Parent::Global.as_str(), GLOBAL_IDENTIFIER);
        assert!(Parent::scope("OnPluginStart").is("OnPluginStart"));
        assert!(!Parent::Global.is(GLOBAL_IDENTIFIER));
    }

    #[test]
    fn test_references_are_shared_between_clones() {
        let item = SymbolItem::new(
            "g_Count",
            uri(),
            Range::on_line(0, 4, 7),
            ItemDetail::Variable { type_name: "int".into() },
        );
        let clone = item.clone();
        let other = FileUri::from("file:///other.sp");

        clone.references.push(Location::new(other.clone(), Range::on_line(3, 0, 7)));
        clone.references.push(Location::new(uri(), Range::on_line(5, 0, 7)));
        assert_eq!(item.references.len(), 2);

        item.references.purge(&other);
        assert_eq!(clone.references.snapshot(), vec![Location::new(uri(), Range::on_line(5, 0, 7))]);
    }

    #[test]
    fn test_same_declaration_ignores_references() {
        let a = SymbolItem::new(
            "x",
            uri(),
            Range::new(Position::new(1, 4), Position::new(1, 5)),
            ItemDetail::Property { type_name: "int".into() },
        );
        let b = a.clone();
        b.references.push(Location::new(uri(), Range::on_line(9, 2, 1)));
        let fresh = SymbolItem::new("x", uri(), a.range, a.detail.clone());

        assert!(a.same_declaration(&fresh));
        assert!(b.same_declaration(&fresh));
    }
}
