//! The tree a template compiles to.
//!
//! Nodes are plain immutable data: no source references, no render
//! state. A compiled tree can therefore be rendered any number of times,
//! from any thread, against different contexts.

use crate::curly::expression::Expression;
use serde::Serialize;

/// One node of a compiled template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    /// The top of every compiled template. Rendering a root renders its
    /// children in order.
    Root { children: Vec<Node> },
    /// Fixed text, emitted verbatim.
    Literal { text: String },
    /// A `{{ ... }}` substitution: the expression's value, or nothing if
    /// it does not resolve.
    Print { expression: Expression },
    /// An `{% if %}` chain. Branches are in source order; the `else`
    /// branch, when present, is last and has no guard.
    Conditional { branches: Vec<Branch> },
    /// A `{% loop %}` block: children render once per element of the
    /// source value, with `item` bound to the current element.
    Loop {
        source: Expression,
        children: Vec<Node>,
    },
}

/// One arm of a conditional: `if` and `elif` arms carry a guard
/// expression, the `else` arm carries none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub guard: Option<Expression>,
    pub children: Vec<Node>,
}
