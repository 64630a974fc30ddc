//! Token types produced by the tokenizer.
//!
//! A token stream is a flat sequence of literal runs and tags in source
//! order. Every token remembers the raw source text it was cut from and
//! the byte offset where that text starts, so later stages can report
//! positions without re-scanning the template.

use crate::curly::expression::Expression;
use serde::Serialize;

/// What a token means, with tag bodies already split and validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    /// A run of plain text between tags, with escapes already resolved.
    Literal { text: String },
    /// A `{{ expression }}` substitution tag.
    Print { expression: Expression },
    /// A `{% name expression? %}` block opener, e.g. `{% if x %}`.
    ///
    /// The tokenizer does not restrict `name`; the parser decides which
    /// names exist and whether an expression is required.
    BlockStart {
        name: String,
        expression: Option<Expression>,
    },
    /// A `{% /name %}` block closer, e.g. `{% /if %}`.
    BlockEnd { name: String },
}

/// One lexed token: its meaning plus the raw source span it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The verbatim source text, escapes and all.
    pub text: String,
    /// Byte offset of `text` within the template source.
    pub position: usize,
}
