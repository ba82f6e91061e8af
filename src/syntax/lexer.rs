//! Token scanner for SourcePawn source text.
//!
//! The scanner is deliberately shallow: the line parser only needs to know
//! where comments, string literals and identifiers are. Everything else
//! collapses into [`TokenKind::Punct`].

use logos::{Lexer, Logos};

use crate::base::{TextRange, TextSize};

/// Kind of a scanned token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    #[token("//", rest_of_line)]
    LineComment,

    /// Block comments may run to end of file when unterminated.
    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r#""([^"\\\n]|\\[^\n])*"?"#)]
    String,

    #[regex(r"'([^'\\\n]|\\[^\n])*'?")]
    Char,

    /// `#include <...>` / `#tryinclude "..."`, the path is not a string literal.
    #[regex(r"#[ \t]*(try)?include", rest_of_line)]
    IncludeDirective,

    #[regex(r"#[ \t]*[A-Za-z_]+")]
    Directive,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9][A-Za-z0-9_.]*")]
    Number,

    #[token("::")]
    Scope,

    #[token(".")]
    Dot,

    #[token("/")]
    Slash,

    #[regex(r#"[^ \t\r\n\fA-Za-z0-9_"'#/.]"#)]
    Punct,
}

impl TokenKind {
    /// Comments and string/char literals: text that never resolves to a symbol.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::LineComment | TokenKind::BlockComment | TokenKind::String | TokenKind::Char
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

fn rest_of_line(lex: &mut Lexer<'_, TokenKind>) {
    let rest = lex.remainder();
    let len = rest.find('\n').unwrap_or(rest.len());
    lex.bump(len);
}

fn block_comment(lex: &mut Lexer<'_, TokenKind>) {
    let rest = lex.remainder();
    let len = rest.find("*/").map_or(rest.len(), |idx| idx + 2);
    lex.bump(len);
}

/// A scanned token with its byte range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
}

/// Scan `text` into tokens. Bytes the scanner does not recognise are skipped.
pub fn tokenize(text: &str) -> Vec<Token> {
    TokenKind::lexer(text)
        .spanned()
        .filter_map(|(kind, span)| {
            let kind = kind.ok()?;
            let range = TextRange::new(
                TextSize::from(span.start as u32),
                TextSize::from(span.end as u32),
            );
            Some(Token { kind, range })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_line_comment_swallows_rest_of_line() {
        assert_eq!(
            kinds("int x; // x is \"quoted\"\nint y;"),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Punct,
                TokenKind::LineComment,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Punct,
            ]
        );
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let tokens = tokenize("/** doc\n * more\n */ int x;");
        assert_eq!(tokens[0].kind, TokenKind::BlockComment);
        assert_eq!(u32::from(tokens[0].range.end()), 19);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_eof() {
        let text = "int x; /* never closed\nint y;";
        let tokens = tokenize(text);
        let last = tokens.last().copied();
        assert_eq!(last.map(|t| t.kind), Some(TokenKind::BlockComment));
        assert_eq!(last.map(|t| u32::from(t.range.end())), Some(text.len() as u32));
    }

    #[test]
    fn test_string_with_escaped_quote() {
        assert_eq!(
            kinds(r#"PrintToServer("say \"hi\" // not a comment");"#),
            vec![
                TokenKind::Ident,
                TokenKind::Punct,
                TokenKind::String,
                TokenKind::Punct,
                TokenKind::Punct,
            ]
        );
    }

    #[test]
    fn test_include_path_is_not_a_string() {
        assert_eq!(kinds("#include \"utils.inc\""), vec![TokenKind::IncludeDirective]);
        assert_eq!(kinds("#tryinclude <sdktools>"), vec![TokenKind::IncludeDirective]);
    }

    #[test]
    fn test_member_access_tokens() {
        assert_eq!(
            kinds("p.x = Point::Origin;"),
            vec![
                TokenKind::Ident,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::Punct,
                TokenKind::Ident,
                TokenKind::Scope,
                TokenKind::Ident,
                TokenKind::Punct,
            ]
        );
    }
}
