//! Test support for the integration suite.
//!
//! Thin panicking wrappers around the public API: a bad fixture should
//! abort the test on the spot, with the compile error in the message.
//! Not part of the supported surface.

use crate::curly::template::Template;
use serde_json::Value;

/// Compile `text`, panicking with the full error display on failure.
pub fn template(text: &str) -> Template {
    match Template::compile(text) {
        Ok(template) => template,
        Err(error) => panic!("fixture template {text:?} failed to compile: {error}"),
    }
}

/// Compile `text` and render it against `context` in one call.
pub fn render_str(text: &str, context: &Value) -> String {
    template(text).render(context)
}
