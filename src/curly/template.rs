//! The compile-once, render-many template API.
//!
//! [`Template::compile`] runs the tokenizer and parser and keeps only the
//! resulting tree; source text and tokens are dropped. Rendering borrows
//! the tree immutably and cannot fail, so one compiled template can be
//! rendered concurrently against different contexts.

use crate::curly::ast::Node;
use crate::curly::error::CompileError;
use crate::curly::lexing::tokenize;
use crate::curly::parsing::parse;
use crate::curly::rendering;
use serde_json::Value;

/// A compiled template, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    root: Node,
}

impl Template {
    /// Compile template source into a reusable [`Template`].
    ///
    /// All syntax checking happens here; the returned value renders any
    /// context without further validation.
    pub fn compile(text: &str) -> Result<Template, CompileError> {
        let tokens = tokenize(text)?;
        let root = parse(tokens)?;
        Ok(Template { root })
    }

    /// Render against `context`, producing the output text.
    ///
    /// Unresolved expressions print nothing and failed guards pick no
    /// branch, so rendering succeeds for every context value.
    pub fn render(&self, context: &Value) -> String {
        rendering::render(&self.root, context)
    }

    /// The compiled tree, mainly for inspection and dump tooling.
    pub fn root(&self) -> &Node {
        &self.root
    }
}

/// Compile template source. Shorthand for [`Template::compile`].
pub fn compile(text: &str) -> Result<Template, CompileError> {
    Template::compile(text)
}

/// Compile and render in one step, for templates used once.
pub fn render(text: &str, context: &Value) -> Result<String, CompileError> {
    Ok(compile(text)?.render(context))
}
