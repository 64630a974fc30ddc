//! The error surface of template compilation.
//!
//! Tokenizing and parsing each have their own error type; [`CompileError`]
//! folds them into the single type the public API returns. Helpers here
//! turn a byte offset back into a line and column and format a few lines
//! of source around the failure for terminal output.

use crate::curly::lexing::LexError;
use crate::curly::parsing::ParseError;
use std::error::Error;
use std::fmt;

/// Any error that can stop a template from compiling.
///
/// Rendering never fails, so this is the only error the crate surfaces.
#[derive(Debug, Clone)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
}

impl CompileError {
    /// Byte offset of the failure within the template source.
    pub fn position(&self) -> usize {
        match self {
            CompileError::Lex(error) => error.position(),
            CompileError::Parse(error) => error.position(),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(error) => error.fmt(f),
            CompileError::Parse(error) => error.fmt(f),
        }
    }
}

impl Error for CompileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompileError::Lex(error) => Some(error),
            CompileError::Parse(error) => Some(error),
        }
    }
}

impl From<LexError> for CompileError {
    fn from(error: LexError) -> CompileError {
        CompileError::Lex(error)
    }
}

impl From<ParseError> for CompileError {
    fn from(error: ParseError) -> CompileError {
        CompileError::Parse(error)
    }
}

/// Map a byte offset to a 1-based `(line, column)` pair.
///
/// `offset` must lie on a character boundary, which holds for every
/// position this crate reports. Columns count characters, not bytes.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line_start = before.rfind('\n').map(|index| index + 1).unwrap_or(0);
    let line = before.matches('\n').count() + 1;
    let column = source[line_start..offset].chars().count() + 1;
    (line, column)
}

/// Format a few numbered source lines around `offset`, marking the
/// failing line with `>>`.
pub fn format_source_context(source: &str, offset: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    let (line, _) = line_col(source, offset);
    let error_line = (line - 1).min(lines.len() - 1);
    let start = error_line.saturating_sub(2);
    let end = (error_line + 3).min(lines.len());
    let mut context = String::new();
    for index in start..end {
        let marker = if index == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, index + 1, lines[index]));
    }
    context
}
