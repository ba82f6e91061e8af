//! Documentation comments attached to declarations.
//!
//! Two placements are recognised:
//! - a `/** ... */` block or a run of `//` lines directly above a declaration;
//! - a trailing `//<` or `/**< ... */` on the declaration's own line, used for
//!   enum members and struct fields.

use smol_str::SmolStr;

use super::document::TextDocument;
use super::lexer::TokenKind;

/// A parsed documentation comment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocComment {
    pub description: String,
    pub params: Vec<ParamDoc>,
    pub returns: Option<String>,
    pub deprecated: Option<String>,
}

/// Documentation of one parameter (`@param name text`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDoc {
    pub name: SmolStr,
    pub text: String,
}

impl DocComment {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
            && self.params.is_empty()
            && self.returns.is_none()
            && self.deprecated.is_none()
    }

    /// Documentation of parameter `name`, if any.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.text.as_str())
    }

    /// Parse the raw text of one or more comments.
    pub fn parse(raw: &str) -> Self {
        let mut doc = DocComment::default();
        // Which section continuation lines belong to.
        enum Section {
            Description,
            Param(usize),
            Returns,
            Deprecated,
        }
        let mut section = Section::Description;

        for line in raw.lines().map(strip_comment_markers) {
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix("@param") {
                let rest = rest.trim_start();
                let (name, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                doc.params.push(ParamDoc {
                    name: SmolStr::new(name),
                    text: text.trim().to_string(),
                });
                section = Section::Param(doc.params.len() - 1);
            } else if let Some(rest) = line.strip_prefix("@return") {
                let rest = rest.strip_prefix('s').unwrap_or(rest);
                doc.returns = Some(rest.trim().to_string());
                section = Section::Returns;
            } else if let Some(rest) = line.strip_prefix("@deprecated") {
                doc.deprecated = Some(rest.trim().to_string());
                section = Section::Deprecated;
            } else if line.starts_with('@') {
                // Other tags (`@error`, `@note`) read as plain description.
                push_text(&mut doc.description, line.trim_start_matches('@'));
                section = Section::Description;
            } else {
                let target = match section {
                    Section::Description => &mut doc.description,
                    Section::Param(idx) => &mut doc.params[idx].text,
                    Section::Returns => doc.returns.get_or_insert_with(String::new),
                    Section::Deprecated => doc.deprecated.get_or_insert_with(String::new),
                };
                push_text(target, line);
            }
        }
        doc
    }
}

fn push_text(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

fn strip_comment_markers(line: &str) -> &str {
    let mut line = line.trim();
    line = line.strip_suffix("*/").unwrap_or(line).trim_end();
    for prefix in ["/**<", "/**", "/*", "//<", "//", "*"] {
        if let Some(rest) = line.strip_prefix(prefix) {
            line = rest;
            break;
        }
    }
    line.trim()
}

/// Find the documentation comment directly above line `line`.
///
/// Blank lines between the comment and the declaration break the link.
pub fn doc_comment_before(doc: &TextDocument, line: u32) -> Option<DocComment> {
    let target = line.checked_sub(1)?;
    let comments: Vec<_> = doc.comments().collect();
    let mut idx = comments.iter().rposition(|c| c.range.end.line == target)?;

    let mut raw = Vec::new();
    loop {
        let comment = comments[idx];
        let text = doc.get_text(comment.range);
        if text.starts_with("//<") || text.starts_with("/**<") || !starts_line(doc, comment) {
            break;
        }
        raw.push(text);
        // A block comment is a complete doc; line comments chain upwards.
        if comment.kind == TokenKind::BlockComment || idx == 0 {
            break;
        }
        let prev = comments[idx - 1];
        if prev.kind != TokenKind::LineComment || prev.range.end.line + 1 != comment.range.start.line {
            break;
        }
        idx -= 1;
    }

    if raw.is_empty() {
        return None;
    }
    raw.reverse();
    let doc = DocComment::parse(&raw.join("\n"));
    (!doc.is_empty()).then_some(doc)
}

/// Find a trailing `//<` / `/**<` comment (or any trailing comment) on `line`.
pub fn trailing_doc_comment(doc: &TextDocument, line: u32) -> Option<String> {
    doc.comments()
        .filter(|c| c.range.start.line == line && !starts_line(doc, c))
        .map(|c| DocComment::parse(doc.get_text(c.range)).description)
        .find(|text| !text.is_empty())
}

fn starts_line(doc: &TextDocument, comment: &super::document::Trivia) -> bool {
    let line = doc.masked_line(comment.range.start.line as usize);
    line.get(..comment.range.start.col as usize)
        .is_some_and(|before| before.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_block_doc() {
        let doc = DocComment::parse(
            "/**\n * Gives health to a client.\n *\n * @param client   Client index.\n * @param amount   Amount\n *                 to add.\n * @return         New health.\n */",
        );

        assert_eq!(doc.description, "Gives health to a client.");
        assert_eq!(doc.params.len(), 2);
        assert_eq!(doc.param("client"), Some("Client index."));
        assert_eq!(doc.param("amount"), Some("Amount to add."));
        assert_eq!(doc.returns.as_deref(), Some("New health."));
    }

    #[test]
    fn test_doc_comment_before_block() {
        let doc = TextDocument::new("/** Max players. */\nint g_MaxPlayers;");
        let parsed = doc_comment_before(&doc, 1);
        assert_eq!(parsed.map(|d| d.description), Some("Max players.".to_string()));
    }

    #[test]
    fn test_doc_comment_before_line_run() {
        let doc = TextDocument::new("int x;\n// First line\n// second line\nvoid F() {}");
        let parsed = doc_comment_before(&doc, 3);
        assert_eq!(
            parsed.map(|d| d.description),
            Some("First line second line".to_string())
        );
    }

    #[test]
    fn test_blank_line_breaks_doc_link() {
        let doc = TextDocument::new("/** Orphan. */\n\nint x;");
        assert!(doc_comment_before(&doc, 2).is_none());
    }

    #[test]
    fn test_trailing_comment_is_not_a_doc_for_next_line() {
        let doc = TextDocument::new("int a; // about a\nint b;");
        assert!(doc_comment_before(&doc, 1).is_none());
        assert_eq!(trailing_doc_comment(&doc, 0), Some("about a".to_string()));
    }

    #[test]
    fn test_trailing_member_doc() {
        let doc = TextDocument::new("    Red, //< The red one\n    Blue /**< The blue one */");
        assert_eq!(trailing_doc_comment(&doc, 0), Some("The red one".to_string()));
        assert_eq!(trailing_doc_comment(&doc, 1), Some("The blue one".to_string()));
    }
}
