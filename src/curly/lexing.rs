//! Tokenization of template source text.
//!
//! A single combined pattern finds every tag in one left-to-right scan;
//! the text between consecutive matches becomes literal tokens. Escaped
//! openers (`\{{`, `\{%`) are skipped by the scanner and stay literal.
//! Tag bodies are split and validated here, so the parser never sees
//! malformed tags.

use crate::curly::expression::{self, Expression};
use crate::curly::token::{Token, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt;

/// The combined tag pattern, two alternatives tried in order:
/// `{{ ... }}` substitution tags and `{% ... %}` block tags.
///
/// Tag bodies exclude braces entirely, so a stray `{` inside a tag makes
/// the opener unterminated rather than swallowing the rest of the line.
static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[^{}]*\}\}|\{%[^{}]*%\}").unwrap());

/// An error found while cutting the source into tokens.
///
/// Every variant carries the byte offset of the offending tag so callers
/// can map it back to a line and column in the source.
#[derive(Debug, Clone)]
pub enum LexError {
    /// An unescaped `{{` or `{%` that is never closed by a matching
    /// `}}` or `%}`.
    UnterminatedTag { opener: String, position: usize },
    /// A tag body that is not a dotted identifier path, e.g. `{{ a b }}`.
    InvalidExpression {
        expression: String,
        tag: String,
        position: usize,
    },
    /// A block tag whose shape is wrong: empty body, a name outside the
    /// identifier grammar, or a bare `{% / %}`.
    InvalidBlockTag { tag: String, position: usize },
}

impl LexError {
    /// Byte offset of the offending tag or opener within the source.
    pub fn position(&self) -> usize {
        match self {
            LexError::UnterminatedTag { position, .. }
            | LexError::InvalidExpression { position, .. }
            | LexError::InvalidBlockTag { position, .. } => *position,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedTag { opener, position } => {
                write!(
                    f,
                    "tag opened with {:?} at offset {} is never closed",
                    opener, position
                )
            }
            LexError::InvalidExpression {
                expression,
                tag,
                position,
            } => {
                write!(
                    f,
                    "invalid expression {:?} in tag {:?} at offset {}: expected a dotted identifier path",
                    expression, tag, position
                )
            }
            LexError::InvalidBlockTag { tag, position } => {
                write!(f, "malformed block tag {:?} at offset {}", tag, position)
            }
        }
    }
}

impl Error for LexError {}

/// Cut `text` into a flat token stream.
///
/// Literal runs between tags are unescaped; tags are split into their
/// kind, name, and expression. Byte positions refer to the original
/// source. An empty input yields an empty stream.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    // `consumed` trails the last accepted token; `search_from` runs ahead
    // of it when escaped openers are skipped.
    let mut consumed = 0;
    let mut search_from = 0;
    while let Some(matched) = TAG_PATTERN.find_at(text, search_from) {
        if is_escaped(text, matched.start()) {
            search_from = matched.start() + 1;
            continue;
        }
        if matched.start() > consumed {
            tokens.push(literal_token(&text[consumed..matched.start()], consumed)?);
        }
        let raw = matched.as_str();
        let body = &raw[2..raw.len() - 2];
        let token = if raw.starts_with("{{") {
            print_token(body, raw, matched.start())?
        } else {
            block_token(body, raw, matched.start())?
        };
        tokens.push(token);
        consumed = matched.end();
        search_from = matched.end();
    }
    if consumed < text.len() {
        tokens.push(literal_token(&text[consumed..], consumed)?);
    }
    Ok(tokens)
}

/// Whether the byte before `position` is a backslash.
fn is_escaped(text: &str, position: usize) -> bool {
    position > 0 && text.as_bytes()[position - 1] == b'\\'
}

/// Build a literal token from the raw gap text at `position`.
///
/// A leftover unescaped opener in a gap means a tag was started but never
/// closed, which is an error rather than silent literal text.
fn literal_token(raw: &str, position: usize) -> Result<Token, LexError> {
    if let Some(index) = find_unescaped_opener(raw) {
        return Err(LexError::UnterminatedTag {
            opener: raw[index..index + 2].to_owned(),
            position: position + index,
        });
    }
    Ok(Token {
        kind: TokenKind::Literal {
            text: unescape(raw),
        },
        text: raw.to_owned(),
        position,
    })
}

/// Find the first `{{` or `{%` in `text` not preceded by a backslash.
fn find_unescaped_opener(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut index = 0;
    while index + 1 < bytes.len() {
        if bytes[index] == b'{'
            && (bytes[index + 1] == b'{' || bytes[index + 1] == b'%')
            && (index == 0 || bytes[index - 1] != b'\\')
        {
            return Some(index);
        }
        index += 1;
    }
    None
}

/// Resolve `\{` and `\}` escapes; every other character passes through,
/// including backslashes not followed by a brace.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '{' || next == '}' {
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn print_token(body: &str, raw: &str, position: usize) -> Result<Token, LexError> {
    let trimmed = body.trim();
    let expression = match Expression::parse(trimmed) {
        Some(expression) => expression,
        None => {
            return Err(LexError::InvalidExpression {
                expression: trimmed.to_owned(),
                tag: raw.to_owned(),
                position,
            })
        }
    };
    Ok(Token {
        kind: TokenKind::Print { expression },
        text: raw.to_owned(),
        position,
    })
}

fn block_token(body: &str, raw: &str, position: usize) -> Result<Token, LexError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(LexError::InvalidBlockTag {
            tag: raw.to_owned(),
            position,
        });
    }
    if let Some(rest) = body.strip_prefix('/') {
        let name = rest.trim();
        if !expression::is_identifier(name) {
            return Err(LexError::InvalidBlockTag {
                tag: raw.to_owned(),
                position,
            });
        }
        return Ok(Token {
            kind: TokenKind::BlockEnd {
                name: name.to_owned(),
            },
            text: raw.to_owned(),
            position,
        });
    }
    let (name, expression_text) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, Some(rest.trim())),
        None => (body, None),
    };
    if !expression::is_identifier(name) {
        return Err(LexError::InvalidBlockTag {
            tag: raw.to_owned(),
            position,
        });
    }
    let expression = match expression_text {
        Some(text) => match Expression::parse(text) {
            Some(expression) => Some(expression),
            None => {
                return Err(LexError::InvalidExpression {
                    expression: text.to_owned(),
                    tag: raw.to_owned(),
                    position,
                })
            }
        },
        None => None,
    };
    Ok(Token {
        kind: TokenKind::BlockStart {
            name: name.to_owned(),
            expression,
        },
        text: raw.to_owned(),
        position,
    })
}
