//! Rendering a compiled tree against a context value.
//!
//! Rendering is pure and infallible: expressions that do not resolve
//! print nothing, guards that do not resolve are false, and loops over
//! anything but an array or object run zero times. The only state is the
//! output buffer and a scope that tracks the current loop element.

use crate::curly::ast::{Branch, Node};
use crate::curly::expression::Expression;
use serde_json::{json, Value};

/// Name bound to the current element inside a loop body.
const ITEM: &str = "item";

/// Render `node` against `context`, returning the produced text.
///
/// `context` is read-only; nested loops shadow `item` per iteration
/// instead of mutating anything, so concurrent renders of one tree are
/// safe.
pub fn render(node: &Node, context: &Value) -> String {
    let mut out = String::new();
    emit(node, Scope::new(context), &mut out);
    out
}

/// Where expressions resolve: the root context plus, inside a loop, the
/// current element. Copied, never mutated, so each loop iteration and
/// nesting level sees exactly the bindings it should.
#[derive(Clone, Copy)]
struct Scope<'a> {
    root: &'a Value,
    item: Option<&'a Value>,
}

impl<'a> Scope<'a> {
    fn new(root: &'a Value) -> Scope<'a> {
        Scope { root, item: None }
    }

    fn with_item(self, item: &'a Value) -> Scope<'a> {
        Scope {
            root: self.root,
            item: Some(item),
        }
    }

    /// Walk the expression's segments over the scope. The root segment
    /// resolves to the current loop element when it is `item` and one is
    /// bound, otherwise it is an ordinary context key.
    fn resolve(&self, expression: &Expression) -> Option<&'a Value> {
        let mut current = match self.item {
            Some(item) if expression.root() == ITEM => item,
            _ => lookup_key(self.root, expression.root())?,
        };
        for segment in &expression.segments()[1..] {
            current = lookup_key(current, segment)?;
        }
        Some(current)
    }
}

/// One lookup step: object fields by name, array elements by decimal
/// index. Anything else has no members.
fn lookup_key<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(entries) => entries.get(segment),
        Value::Array(items) => {
            let index: usize = segment.parse().ok()?;
            items.get(index)
        }
        _ => None,
    }
}

fn emit(node: &Node, scope: Scope<'_>, out: &mut String) {
    match node {
        Node::Root { children } => emit_children(children, scope, out),
        Node::Literal { text } => out.push_str(text),
        Node::Print { expression } => {
            if let Some(value) = scope.resolve(expression) {
                out.push_str(&value_to_text(value));
            }
        }
        Node::Conditional { branches } => emit_conditional(branches, scope, out),
        Node::Loop { source, children } => emit_loop(source, children, scope, out),
    }
}

fn emit_children(children: &[Node], scope: Scope<'_>, out: &mut String) {
    for child in children {
        emit(child, scope, out);
    }
}

/// Render the first branch whose guard holds. An unresolved guard is
/// simply false; the guardless `else` branch always holds.
fn emit_conditional(branches: &[Branch], scope: Scope<'_>, out: &mut String) {
    for branch in branches {
        let selected = match &branch.guard {
            Some(guard) => scope.resolve(guard).is_some_and(is_truthy),
            None => true,
        };
        if selected {
            emit_children(&branch.children, scope, out);
            return;
        }
    }
}

/// Arrays iterate in element order. Objects iterate in key order, each
/// element a `{"key", "value"}` pair. Scalars, strings, and unresolved
/// sources iterate zero times.
fn emit_loop(source: &Expression, children: &[Node], scope: Scope<'_>, out: &mut String) {
    match scope.resolve(source) {
        Some(Value::Array(items)) => {
            for item in items {
                emit_children(children, scope.with_item(item), out);
            }
        }
        Some(Value::Object(entries)) => {
            for (key, value) in entries {
                let pair = json!({ "key": key, "value": value });
                emit_children(children, scope.with_item(&pair), out);
            }
        }
        _ => {}
    }
}

/// The textual image of a value: strings verbatim, numbers and booleans
/// in canonical form, null as nothing, collections as compact JSON.
fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Emptiness decides truth: null, false, zero, and empty strings or
/// collections are false, everything else is true.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}
