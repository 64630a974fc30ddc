//! Command-line interface for curly
//! This binary renders a template against a JSON context, or dumps the
//! token stream / compiled tree for inspection.
//!
//! Usage:
//!   curly '<context-json>' `<path>`                       - Render a template file
//!   curly '<context-json>' -                             - Render template text from stdin
//!   curly '<context-json>' `<path>` [--format `<format>`]  - Dump tokens or the compiled tree

use clap::{Arg, Command};
use curly::curly::error::{format_source_context, line_col, CompileError};
use curly::curly::lexing::tokenize;
use curly::Template;
use serde_json::Value;
use std::io::Read;

fn main() {
    let matches = Command::new("curly")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A minimal template engine for curly-brace templates")
        .arg(
            Arg::new("context")
                .help("Context for template rendering, a JSON value")
                .default_value("{}")
                .index(1),
        )
        .arg(
            Arg::new("template")
                .help("Path to the template file ('-' reads standard input)")
                .default_value("-")
                .index(2),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: rendered, tokens, or ast")
                .default_value("rendered"),
        )
        .get_matches();

    let context_text = matches.get_one::<String>("context").unwrap();
    let template_path = matches.get_one::<String>("template").unwrap();
    let format = matches.get_one::<String>("format").unwrap();

    let context: Value = serde_json::from_str(context_text).unwrap_or_else(|e| {
        eprintln!("Invalid context JSON: {}", e);
        std::process::exit(1);
    });
    let source = read_template(template_path).unwrap_or_else(|e| {
        eprintln!("Cannot read template '{}': {}", template_path, e);
        std::process::exit(1);
    });

    let output = match format.as_str() {
        "rendered" => render_template(&source, &context),
        "tokens" => dump_tokens(&source),
        "ast" => dump_tree(&source),
        other => {
            eprintln!("Format '{}' not supported", other);
            eprintln!("Available formats: rendered, tokens, ast");
            std::process::exit(1);
        }
    };

    print!("{}", output);
}

fn read_template(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path)
}

/// Handle the default format: compile and render.
fn render_template(source: &str, context: &Value) -> String {
    let template = Template::compile(source).unwrap_or_else(|e| report_compile_error(source, e));
    template.render(context)
}

/// Handle `--format tokens`: the raw token stream as pretty JSON.
fn dump_tokens(source: &str) -> String {
    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) => report_compile_error(source, e.into()),
    };
    serde_json::to_string_pretty(&tokens).unwrap_or_else(|e| {
        eprintln!("Error formatting tokens: {}", e);
        std::process::exit(1);
    })
}

/// Handle `--format ast`: the compiled tree as pretty JSON.
fn dump_tree(source: &str) -> String {
    let template = Template::compile(source).unwrap_or_else(|e| report_compile_error(source, e));
    serde_json::to_string_pretty(template.root()).unwrap_or_else(|e| {
        eprintln!("Error formatting tree: {}", e);
        std::process::exit(1);
    })
}

/// Print the error with line, column, and surrounding source, then exit.
fn report_compile_error(source: &str, error: CompileError) -> ! {
    let (line, column) = line_col(source, error.position());
    eprintln!("Compile error: {}", error);
    eprintln!("  at line {}, column {}:", line, column);
    eprint!("{}", format_source_context(source, error.position()));
    std::process::exit(1);
}
