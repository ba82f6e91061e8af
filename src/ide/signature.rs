//! Signature help for the call the cursor is in.

use crate::base::{Position, Range};
use crate::hir::{PositionResolver, SymbolItem};

/// How many lines above the cursor an open call is searched for.
const LOOKBACK_LINES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    /// The parameter as declared.
    pub label: String,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub label: String,
    pub documentation: Option<String>,
    pub parameters: Vec<ParameterInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHelp {
    pub signatures: Vec<SignatureInfo>,
    pub active_signature: u32,
    pub active_parameter: u32,
}

impl SignatureInfo {
    pub fn from_item(item: &SymbolItem) -> Option<Self> {
        let signature = item.signature()?;
        let doc = item.description.as_ref();
        let parameters = signature
            .params
            .iter()
            .map(|param| ParameterInfo {
                label: param.text.to_string(),
                documentation: doc.and_then(|d| d.param(&param.name)).map(str::to_string),
            })
            .collect();
        Some(Self {
            label: signature.text.clone(),
            documentation: doc.map(|d| d.description.clone()).filter(|d| !d.is_empty()),
            parameters,
        })
    }
}

/// An open call: where its callee name is and how many arguments precede
/// the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenCall {
    callee: Range,
    active_parameter: u32,
}

/// Signature help at `pos`. `None` outside a call, inside comments and
/// strings, or when the callee is unknown.
pub fn signature_help(resolver: &PositionResolver<'_>, pos: Position) -> Option<SignatureHelp> {
    let doc = resolver.doc();
    if doc.is_in_comment(pos) || doc.is_in_string(pos) {
        return None;
    }
    let call = find_open_call(resolver, pos)?;
    let signatures: Vec<_> = resolver
        .resolve_word(call.callee)
        .iter()
        .filter_map(|item| SignatureInfo::from_item(item))
        .collect();
    if signatures.is_empty() {
        return None;
    }
    Some(SignatureHelp {
        signatures,
        active_signature: 0,
        active_parameter: call.active_parameter,
    })
}

fn find_open_call(resolver: &PositionResolver<'_>, pos: Position) -> Option<OpenCall> {
    let doc = resolver.doc();
    let mut depth = 0u32;
    let mut commas = 0u32;
    let floor = pos.line.saturating_sub(LOOKBACK_LINES);

    for line_nb in (floor..=pos.line).rev() {
        let line = doc.masked_line(line_nb as usize);
        let end = if line_nb == pos.line {
            (pos.col as usize).min(line.len())
        } else {
            line.len()
        };
        let bytes = line.as_bytes();
        for idx in (0..end).rev() {
            match bytes[idx] {
                b')' | b']' | b'}' => depth += 1,
                b'(' if depth == 0 => {
                    let name_end = line[..idx].trim_end().len();
                    let name_start = line[..name_end]
                        .rfind(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
                        .map_or(0, |i| i + 1);
                    if name_start == name_end {
                        return None;
                    }
                    return Some(OpenCall {
                        callee: Range::on_line(line_nb, name_start as u32, (name_end - name_start) as u32),
                        active_parameter: commas,
                    });
                }
                b'(' | b'[' | b'{' if depth > 0 => depth -= 1,
                // Opening a block or array literal: not in a call.
                b'[' | b'{' | b';' => return None,
                b',' if depth == 0 => commas += 1,
                _ => {}
            }
        }
    }
    None
}
