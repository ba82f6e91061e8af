// Text access and lexical helpers shared by the parser and resolver
pub mod doc_comment;
pub mod document;
pub mod lexer;

pub use doc_comment::{DocComment, ParamDoc, doc_comment_before, trailing_doc_comment};
pub use document::{TextDocument, Trivia, is_word_char, is_word_start};
pub use lexer::{Token, TokenKind, tokenize};
