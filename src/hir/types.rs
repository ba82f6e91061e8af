//! Receiver type inference for member access, and methodmap inheritance.
//!
//! Inference is a textual heuristic: the expression before a `.` or `::` is
//! split into an access chain (`a.b().c`), the root's declared type is
//! looked up among the visible items, and each following step is resolved
//! as a member of the previous step's type. Anything not understood yields
//! `None`, which callers treat as "no members".

use std::sync::Arc;

use indexmap::IndexSet;
use regex::Regex;
use smol_str::SmolStr;

use crate::base::{Position, Range};
use crate::parser::is_keyword;
use crate::syntax::TextDocument;

use super::scope::ScopeContext;
use super::symbols::{SymbolItem, SymbolKind};

/// One step of an access chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A variable, field or type name.
    Name(SmolStr),
    /// A call of a function or method.
    Call(SmolStr),
    /// An expression whose type is written out: `new T(...)`, `view_as<T>(...)`.
    Typed(SmolStr),
}

// ============================================================================
// ACCESS CHAINS
// ============================================================================

/// Byte offset of the accessor (`.` or the first `:` of `::`) right before
/// column `col` of `line`, if the word there is a member access.
pub fn accessor_before(line: &str, col: usize) -> Option<usize> {
    let before = line.get(..col)?.trim_end();
    if before.ends_with("::") {
        Some(before.len() - 2)
    } else if before.ends_with('.') && !before.ends_with("..") {
        Some(before.len() - 1)
    } else {
        None
    }
}

/// Split the expression ending right before the accessor at `accessor`
/// into its access chain, root first.
pub fn receiver_chain(line: &str, accessor: usize) -> Option<Vec<Step>> {
    let bytes = line.as_bytes();
    let mut end = accessor;
    let mut steps = Vec::new();

    loop {
        let mut i = skip_ws_back(bytes, end);
        while i > 0 && bytes[i - 1] == b']' {
            i = skip_ws_back(bytes, matching_open(bytes, i - 1, b'[', b']')?);
        }

        let mut call = false;
        if i > 0 && bytes[i - 1] == b')' {
            i = skip_ws_back(bytes, matching_open(bytes, i - 1, b'(', b')')?);
            call = true;
            if i > 0 && bytes[i - 1] == b'>' {
                let lt = line[..i - 1].rfind('<')?;
                let keyword_end = skip_ws_back(bytes, lt);
                let keyword_start = ident_start(bytes, keyword_end)?;
                if &line[keyword_start..keyword_end] != "view_as" {
                    return None;
                }
                steps.push(Step::Typed(SmolStr::new(line[lt + 1..i - 1].trim())));
                break;
            }
        }

        let start = ident_start(bytes, i)?;
        let name = SmolStr::new(&line[start..i]);
        let before = skip_ws_back(bytes, start);

        if call && before < start && before >= 3 && &line[before - 3..before] == "new" {
            let boundary = before == 3 || !is_ident_byte(bytes[before - 4]);
            if boundary {
                steps.push(Step::Typed(name));
                break;
            }
        }
        steps.push(if call { Step::Call(name) } else { Step::Name(name) });

        if before > 0 && bytes[before - 1] == b'.' {
            end = before - 1;
        } else if before > 1 && &line[before - 2..before] == "::" {
            end = before - 2;
        } else {
            break;
        }
    }

    steps.reverse();
    Some(steps)
}

fn is_ident_byte(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

/// Index just past the last non-blank byte before `end`.
fn skip_ws_back(bytes: &[u8], end: usize) -> usize {
    let mut i = end;
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    i
}

/// Start of the identifier ending at `end`. `None` when there is none or
/// it is a number.
fn ident_start(bytes: &[u8], end: usize) -> Option<usize> {
    let mut i = end;
    while i > 0 && is_ident_byte(bytes[i - 1]) {
        i -= 1;
    }
    (i < end && !bytes[i].is_ascii_digit()).then_some(i)
}

/// Index of the bracket opening the one closed at `close`.
fn matching_open(bytes: &[u8], close: usize, open: u8, shut: u8) -> Option<usize> {
    let mut depth = 0u32;
    for i in (0..=close).rev() {
        if bytes[i] == shut {
            depth += 1;
        } else if bytes[i] == open {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

// ============================================================================
// INFERENCE
// ============================================================================

/// Static type of the receiver of the member access at `word`, or `None`
/// when it cannot be determined.
pub fn infer_receiver_type(
    doc: &TextDocument,
    items: &[Arc<SymbolItem>],
    scope: &ScopeContext,
    word: Range,
) -> Option<SmolStr> {
    let line = doc.masked_line(word.start.line as usize);
    let accessor = accessor_before(line, word.start.col as usize)?;
    let chain = receiver_chain(line, accessor)?;
    let (root, rest) = chain.split_first()?;

    let mut ty = root_type(doc, items, scope, root, word.start)?;
    for step in rest {
        let (name, want_call) = match step {
            Step::Name(name) => (name, false),
            Step::Call(name) => (name, true),
            Step::Typed(ty) => return Some(ty.clone()),
        };
        let chain = expand_inheritance(&ty, items);
        let member = members_named(items, &chain, name)
            .into_iter()
            .find(|m| (m.kind() == SymbolKind::Method) == want_call)?;
        ty = SmolStr::new(member.type_name()?);
    }
    tracing::trace!(receiver = %ty, "inferred receiver type");
    Some(ty)
}

fn root_type(
    doc: &TextDocument,
    items: &[Arc<SymbolItem>],
    scope: &ScopeContext,
    root: &Step,
    at: Position,
) -> Option<SmolStr> {
    match root {
        Step::Typed(ty) => Some(ty.clone()),
        Step::Name(name) if name == "this" => scope.container_name().map(SmolStr::new),
        Step::Name(name) => {
            let local = items
                .iter()
                .filter(|i| i.name == *name && scope.is_local(i))
                .filter(|i| i.range.start <= at)
                .max_by_key(|i| i.range.start);
            if let Some(ty) = local.and_then(|i| i.type_name()) {
                return Some(SmolStr::new(ty));
            }
            let global = items.iter().find(|i| {
                i.name == *name && i.parent.is_global() && i.kind() == SymbolKind::Variable
            });
            if let Some(ty) = global.and_then(|i| i.type_name()) {
                return Some(SmolStr::new(ty));
            }
            // `Type.StaticMethod()`
            if items.iter().any(|i| i.name == *name && i.kind().is_container()) {
                return Some(name.clone());
            }
            let floor = scope.function.as_deref().map_or(0, |f| f.full_range.start.line);
            scan_declaration(doc, name, at.line, floor)
        }
        Step::Call(name) => {
            if let Some(container) = scope.container_name() {
                let method = items.iter().find(|i| {
                    i.name == *name && i.kind() == SymbolKind::Method && i.parent.is(container)
                });
                if let Some(ty) = method.and_then(|m| m.type_name()) {
                    return Some(SmolStr::new(ty));
                }
            }
            let function = items
                .iter()
                .find(|i| i.name == *name && i.kind() == SymbolKind::Function);
            if let Some(ty) = function.and_then(|f| f.type_name()) {
                return Some(SmolStr::new(ty));
            }
            items
                .iter()
                .any(|i| i.name == *name && i.kind() == SymbolKind::Methodmap)
                .then(|| name.clone())
        }
    }
}

/// Scan lines `line` down to `floor` for a declaration or `new` assignment
/// of `name`, nearest first.
fn scan_declaration(doc: &TextDocument, name: &str, line: u32, floor: u32) -> Option<SmolStr> {
    let name = regex::escape(name);
    let declaration = Regex::new(&format!(
        r"(?:^|[^\w.])([A-Za-z_]\w*)(?:\s*\[\s*\])*\s+(?:&\s*)?{name}\b"
    ))
    .ok()?;
    let tagged = Regex::new(&format!(r"(?:^|[^\w.])([A-Za-z_]\w*)\s*:\s*{name}\b")).ok()?;
    let assigned = Regex::new(&format!(
        r"\b{name}\s*=\s*(?:new\s+([A-Za-z_]\w*)|view_as\s*<\s*([A-Za-z_]\w*)\s*>)"
    ))
    .ok()?;

    for n in (floor..=line).rev() {
        let text = doc.masked_line(n as usize);
        if let Some(caps) = assigned.captures(text) {
            if let Some(ty) = caps.get(1).or_else(|| caps.get(2)) {
                return Some(SmolStr::new(ty.as_str()));
            }
        }
        for re in [&declaration, &tagged] {
            let found = re
                .captures_iter(text)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str())
                .find(|ty| !is_keyword(ty) || *ty == "new" || *ty == "decl");
            match found {
                Some("new" | "decl") => return Some(SmolStr::new_inline("int")),
                Some(ty) => return Some(SmolStr::new(ty)),
                None => {}
            }
        }
    }
    None
}

// ============================================================================
// INHERITANCE
// ============================================================================

/// `type_name` followed by every methodmap it transitively inherits from.
pub fn expand_inheritance(type_name: &str, items: &[Arc<SymbolItem>]) -> IndexSet<SmolStr> {
    let mut chain = IndexSet::new();
    let mut current = Some(SmolStr::new(type_name));
    while let Some(name) = current.take() {
        if !chain.insert(name.clone()) {
            tracing::trace!(methodmap = %name, "inheritance cycle");
            break;
        }
        current = items
            .iter()
            .find(|i| i.kind() == SymbolKind::Methodmap && i.name == name)
            .and_then(|i| i.inherits())
            .map(SmolStr::new);
    }
    chain
}

/// Methods and properties owned by a type of `chain`.
pub fn members_of(items: &[Arc<SymbolItem>], chain: &IndexSet<SmolStr>) -> Vec<Arc<SymbolItem>> {
    items
        .iter()
        .filter(|i| matches!(i.kind(), SymbolKind::Method | SymbolKind::Property))
        .filter(|i| i.parent.name().is_some_and(|p| chain.contains(p)))
        .cloned()
        .collect()
}

/// Members of `chain` called `name`, nearest type first.
pub fn members_named(
    items: &[Arc<SymbolItem>],
    chain: &IndexSet<SmolStr>,
    name: &str,
) -> Vec<Arc<SymbolItem>> {
    let mut members: Vec<_> = members_of(items, chain)
        .into_iter()
        .filter(|m| m.name == name)
        .collect();
    members.sort_by_key(|m| m.parent.name().and_then(|p| chain.get_index_of(p)));
    members
}
