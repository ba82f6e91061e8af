//! Position resolution: which declarations the word under a cursor names.
//!
//! Resolution works on the flattened item list of the file's include
//! closure. The word's syntactic role is read from the text around it:
//!
//! 1. `recv.word` / `Type::word`: member of the receiver's inferred type
//!    and the types it inherits from.
//! 2. `new Word(`: constructors of `Word`.
//! 3. `word(`: same-scope methods first, otherwise free functions.
//! 4. anything else: locals of the enclosing function, then members of
//!    the enclosing type, then globals.
//!
//! Positions inside comments and string literals are [`ResolveResult::NotApplicable`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

use crate::base::{FileUri, Position, Range};
use crate::parser::is_keyword;
use crate::project::{IncludeResolver, include_file_name};
use crate::syntax::TextDocument;

use super::scope::ScopeContext;
use super::symbols::{ItemDetail, SymbolItem, SymbolKind};
use super::types::{accessor_before, expand_inheritance, infer_receiver_type, members_named};

static INCLUDE_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*#\s*(?:try)?include\s*[<"]([^>"]+)[>"]?"#).expect("invalid include line regex")
});

static NEW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^A-Za-z0-9_])new\s+$").expect("invalid new regex"));

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of resolving a position.
#[derive(Clone, Debug)]
pub enum ResolveResult {
    /// The position is in a comment or string; nothing should be shown.
    NotApplicable,
    /// A word was looked up but names nothing visible.
    NoMatch,
    /// Every declaration the word may refer to, best candidate first.
    Matches(Vec<Arc<SymbolItem>>),
}

impl ResolveResult {
    pub fn from_items(items: Vec<Arc<SymbolItem>>) -> Self {
        if items.is_empty() {
            ResolveResult::NoMatch
        } else {
            ResolveResult::Matches(items)
        }
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, ResolveResult::NotApplicable)
    }

    pub fn items(&self) -> &[Arc<SymbolItem>] {
        match self {
            ResolveResult::Matches(items) => items,
            _ => &[],
        }
    }

    pub fn into_items(self) -> Vec<Arc<SymbolItem>> {
        match self {
            ResolveResult::Matches(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn first(&self) -> Option<&Arc<SymbolItem>> {
        self.items().first()
    }
}

/// Syntactic role of a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenRole {
    Member,
    Constructor,
    Call,
    Plain,
}

/// Classify the word spanning bytes `start..end` of `line`.
pub fn classify(line: &str, start: usize, end: usize) -> TokenRole {
    if accessor_before(line, start).is_some() {
        return TokenRole::Member;
    }
    if line.get(..start).is_some_and(|prefix| NEW_RE.is_match(prefix)) {
        return TokenRole::Constructor;
    }
    let followed_by_paren = line
        .get(end..)
        .is_some_and(|rest| rest.trim_start().starts_with('('));
    if followed_by_paren {
        TokenRole::Call
    } else {
        TokenRole::Plain
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Resolves positions of one document against the items visible from it.
pub struct PositionResolver<'a> {
    uri: &'a FileUri,
    doc: &'a TextDocument,
    items: &'a [Arc<SymbolItem>],
    includes: Option<&'a dyn IncludeResolver>,
}

impl<'a> PositionResolver<'a> {
    pub fn new(uri: &'a FileUri, doc: &'a TextDocument, items: &'a [Arc<SymbolItem>]) -> Self {
        Self {
            uri,
            doc,
            items,
            includes: None,
        }
    }

    /// Resolve `#include` lines through `resolver`.
    pub fn with_include_resolver(mut self, resolver: &'a dyn IncludeResolver) -> Self {
        self.includes = Some(resolver);
        self
    }

    pub fn items(&self) -> &'a [Arc<SymbolItem>] {
        self.items
    }

    pub fn uri(&self) -> &'a FileUri {
        self.uri
    }

    pub fn doc(&self) -> &'a TextDocument {
        self.doc
    }

    pub fn scope_at(&self, pos: Position) -> ScopeContext {
        ScopeContext::at(self.items, self.uri, pos)
    }

    pub fn resolve(&self, pos: Position) -> ResolveResult {
        // A cursor right after a word may already touch a following comment.
        let word = self.doc.word_range_at(pos);
        let at = word.map_or(pos, |w| w.start);
        if self.doc.is_in_comment(at) || self.doc.is_in_string(at) {
            return ResolveResult::NotApplicable;
        }

        let line = self.doc.line_at(pos.line as usize);
        if let Some(path) = INCLUDE_LINE_RE.captures(line).and_then(|c| c.get(1)) {
            return self.resolve_include(path.as_str(), pos.line, path.start());
        }

        match word {
            Some(word) => ResolveResult::from_items(self.resolve_word(word)),
            None => ResolveResult::NoMatch,
        }
    }

    fn resolve_include(&self, path: &str, line: u32, col: usize) -> ResolveResult {
        let Some(target) = self.includes.and_then(|r| r.resolve(self.uri, &include_file_name(path))) else {
            return ResolveResult::NoMatch;
        };
        let mut item = SymbolItem::new(
            path,
            target.clone(),
            Range::default(),
            ItemDetail::Include { target },
        );
        // The span the include was written at, for hover highlighting.
        item.full_range = Range::on_line(line, col as u32, path.len() as u32);
        ResolveResult::Matches(vec![Arc::new(item)])
    }

    /// Declarations the word at `word` may refer to. The word must be an
    /// identifier outside comments and strings.
    pub fn resolve_word(&self, word: Range) -> Vec<Arc<SymbolItem>> {
        let name = self.doc.get_text(word);
        if name.is_empty() || is_keyword(name) {
            return Vec::new();
        }
        let line = self.doc.masked_line(word.start.line as usize);
        let role = classify(line, word.start.col as usize, word.end.col as usize);
        let scope = self.scope_at(word.start);
        tracing::trace!(
            word = name,
            ?role,
            function = scope.function_name(),
            container = scope.container_name(),
            "resolving word"
        );

        match role {
            TokenRole::Member => self.members(name, &scope, word),
            TokenRole::Constructor => self.constructors(name),
            TokenRole::Call => self.callables(name, &scope),
            TokenRole::Plain => self.plain(name, &scope, word.start),
        }
    }

    fn members(&self, name: &str, scope: &ScopeContext, word: Range) -> Vec<Arc<SymbolItem>> {
        let Some(ty) = infer_receiver_type(self.doc, self.items, scope, word) else {
            return Vec::new();
        };
        let chain = expand_inheritance(&ty, self.items);
        members_named(self.items, &chain, name)
    }

    fn constructors(&self, name: &str) -> Vec<Arc<SymbolItem>> {
        let constructors = self.collect(|i| i.kind() == SymbolKind::Constructor && i.name == name);
        if !constructors.is_empty() {
            return constructors;
        }
        self.collect(|i| i.kind().is_container() && i.name == name)
    }

    fn callables(&self, name: &str, scope: &ScopeContext) -> Vec<Arc<SymbolItem>> {
        if let Some(container) = scope.container_name() {
            let methods = self.collect(|i| {
                matches!(i.kind(), SymbolKind::Method | SymbolKind::Constructor)
                    && i.parent.is(container)
                    && i.name == name
            });
            if !methods.is_empty() {
                return methods;
            }
        }
        let free = self.collect(|i| i.kind().is_free_callable() && i.parent.is_global() && i.name == name);
        if !free.is_empty() {
            return free;
        }
        // Function-like macros.
        self.collect(|i| matches!(i.detail, ItemDetail::Define { .. }) && i.name == name)
    }

    fn plain(&self, name: &str, scope: &ScopeContext, at: Position) -> Vec<Arc<SymbolItem>> {
        let locals = self.collect(|i| i.name == name && scope.is_local(i));
        if !locals.is_empty() {
            // The nearest declaration at or before the use wins among
            // same-named locals of sibling blocks.
            let nearest = locals
                .iter()
                .filter(|l| l.range.start <= at)
                .max_by_key(|l| l.range.start)
                .cloned();
            return match nearest {
                Some(local) => vec![local],
                None => locals,
            };
        }

        if scope.container_name().is_some() {
            let members = self.collect(|i| i.name == name && scope.is_own_member(i));
            if !members.is_empty() {
                return members;
            }
        }

        let container = scope.container_name();
        self.collect(|i| {
            i.name == name
                && (i.parent.is_global() || i.kind() == SymbolKind::EnumMember)
                && !i.kind().is_member()
                && i.kind() != SymbolKind::Include
                && i.enum_struct_name.as_deref().is_none_or(|es| Some(es) == container)
        })
    }

    fn collect(&self, pred: impl Fn(&SymbolItem) -> bool) -> Vec<Arc<SymbolItem>> {
        self.items.iter().filter(|i| pred(i)).cloned().collect()
    }
}

/// Name of the word at `pos`, if any.
pub fn word_at(doc: &TextDocument, pos: Position) -> Option<SmolStr> {
    doc.word_range_at(pos).map(|r| SmolStr::new(doc.get_text(r)))
}
