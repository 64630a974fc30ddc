//! Expressions: dotted identifier paths referencing context data.
//!
//! The only expression form curly knows is a path like `item.key`: a
//! non-empty sequence of `.`-separated identifiers, each matching
//! `[A-Za-z0-9_-]+`. There are no operators, literals, or function calls;
//! anything fancier than a path is rejected at tokenize time.

use serde::{Serialize, Serializer};
use std::fmt;

/// A dotted path of identifiers, e.g. `user.name` or `items.0.key`.
///
/// Validated once during tokenization; at render time the segments are
/// walked left to right over the context value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    segments: Vec<String>,
}

impl Expression {
    /// Parse `text` as a dotted identifier path.
    ///
    /// Returns `None` if `text` is empty, has an empty segment (leading,
    /// trailing, or doubled dots), or contains a character outside the
    /// identifier grammar. The tokenizer wraps the failure in a
    /// positioned error.
    pub fn parse(text: &str) -> Option<Expression> {
        let segments: Vec<&str> = text.split('.').collect();
        if !segments.iter().all(|segment| is_identifier(segment)) {
            return None;
        }
        Some(Expression {
            segments: segments.into_iter().map(str::to_owned).collect(),
        })
    }

    /// The path segments, in source order. Never empty.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment, the name resolved against the current scope.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

// Serialized as the dotted source form so token and AST dumps stay readable.
impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whether `text` is a single valid identifier: `[A-Za-z0-9_-]+`.
///
/// Shared with the tokenizer, which applies the same grammar to block
/// names.
pub(crate) fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}
