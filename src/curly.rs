//! Main module for curly template functionality

pub mod ast;
pub mod error;
pub mod expression;
pub mod lexing;
pub mod parsing;
pub mod rendering;
pub mod template;
pub mod testing;
pub mod token;
