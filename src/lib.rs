//! # curly
//!
//! A minimal template engine for curly-brace templates.
//!
//! Templates are plain text with three tag forms:
//!
//! ```text
//! {{ user.name }}                          substitution
//! {% if x %}...{% elif y %}...{% else %}...{% /if %}
//! {% loop items %}...{{ item }}...{% /loop %}
//! ```
//!
//! Expressions are dotted identifier paths resolved against a JSON
//! context; `\{` and `\}` put literal braces in the output. Compiling
//! checks all syntax up front, rendering never fails. Render recursion
//! follows block nesting, so absurdly deep templates can exhaust the
//! stack; compile depth is flat.

pub mod curly;

pub use curly::error::CompileError;
pub use curly::lexing::LexError;
pub use curly::parsing::ParseError;
pub use curly::template::{compile, render, Template};
