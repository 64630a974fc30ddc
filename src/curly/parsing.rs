//! Stack-based parsing of a token stream into a tree.
//!
//! Tokens are consumed left to right. Finished nodes are shifted onto an
//! explicit stack; block openers push unfinished entries that wait for
//! their closer. A closer (or `elif`/`else`) pops finished nodes down to
//! the innermost unfinished entry and reduces them into it, so nesting
//! resolves innermost-first without recursion. Whatever remains open at
//! the end of input is an error.

use crate::curly::ast::{Branch, Node};
use crate::curly::expression::Expression;
use crate::curly::token::{Token, TokenKind};
use std::error::Error;
use std::fmt;

/// A structural error in an otherwise well-formed token stream.
///
/// `tag` is the verbatim source text of the tag that exposed the
/// problem and `position` its byte offset.
#[derive(Debug, Clone)]
pub enum ParseError {
    /// A block tag with a name other than `if`, `elif`, `else`, `loop`.
    UnknownBlockName {
        name: String,
        tag: String,
        position: usize,
    },
    /// `if`, `elif`, or `loop` without an expression.
    MissingExpression {
        name: String,
        tag: String,
        position: usize,
    },
    /// `else` with an expression.
    StrayExpression { tag: String, position: usize },
    /// `elif` or `else` with no `if` chain to extend.
    DanglingBranch {
        name: String,
        tag: String,
        position: usize,
    },
    /// `elif` or `else` after the chain already took its `else` branch.
    BranchAfterElse {
        name: String,
        tag: String,
        position: usize,
    },
    /// `{% /elif %}` or `{% /else %}`: branches have no end tags of
    /// their own, the chain closes with `{% /if %}`.
    UnclosableBlock {
        name: String,
        tag: String,
        position: usize,
    },
    /// An end tag with no open block at all.
    UnexpectedEndTag {
        name: String,
        tag: String,
        position: usize,
    },
    /// An end tag whose name does not match the innermost open block.
    MismatchedEndTag {
        found: String,
        open: String,
        tag: String,
        position: usize,
    },
    /// Input ended while a block was still open. Reports the outermost
    /// unclosed opener.
    UnclosedBlock {
        name: String,
        tag: String,
        position: usize,
    },
}

impl ParseError {
    /// Byte offset of the tag that exposed the problem.
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnknownBlockName { position, .. }
            | ParseError::MissingExpression { position, .. }
            | ParseError::StrayExpression { position, .. }
            | ParseError::DanglingBranch { position, .. }
            | ParseError::BranchAfterElse { position, .. }
            | ParseError::UnclosableBlock { position, .. }
            | ParseError::UnexpectedEndTag { position, .. }
            | ParseError::MismatchedEndTag { position, .. }
            | ParseError::UnclosedBlock { position, .. } => *position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownBlockName {
                name,
                tag,
                position,
            } => {
                write!(
                    f,
                    "unknown block name {:?} in tag {:?} at offset {}",
                    name, tag, position
                )
            }
            ParseError::MissingExpression {
                name,
                tag,
                position,
            } => {
                write!(
                    f,
                    "{} tag {:?} at offset {} requires an expression",
                    name, tag, position
                )
            }
            ParseError::StrayExpression { tag, position } => {
                write!(
                    f,
                    "else tag {:?} at offset {} takes no expression",
                    tag, position
                )
            }
            ParseError::DanglingBranch {
                name,
                tag,
                position,
            } => {
                write!(
                    f,
                    "{} tag {:?} at offset {} has no open if block",
                    name, tag, position
                )
            }
            ParseError::BranchAfterElse {
                name,
                tag,
                position,
            } => {
                write!(
                    f,
                    "{} tag {:?} at offset {} follows an else branch, which must come last",
                    name, tag, position
                )
            }
            ParseError::UnclosableBlock {
                name,
                tag,
                position,
            } => {
                write!(
                    f,
                    "{} takes no end tag: {:?} at offset {}",
                    name, tag, position
                )
            }
            ParseError::UnexpectedEndTag {
                name,
                tag,
                position,
            } => {
                write!(
                    f,
                    "end tag {:?} at offset {} has no matching open {} block",
                    tag, position, name
                )
            }
            ParseError::MismatchedEndTag {
                found,
                open,
                tag,
                position,
            } => {
                write!(
                    f,
                    "end tag {:?} at offset {} closes {}, but the innermost open block is {}",
                    tag, position, found, open
                )
            }
            ParseError::UnclosedBlock {
                name,
                tag,
                position,
            } => {
                write!(
                    f,
                    "{} block opened by {:?} at offset {} is never closed",
                    name, tag, position
                )
            }
        }
    }
}

impl Error for ParseError {}

/// One stack entry: either a finished node or a block still waiting for
/// its closer. Open entries keep their opener's source text for error
/// reports.
enum Entry {
    Finished(Node),
    /// An `{% if %}` chain collecting closed branches. Exactly one
    /// `OpenBranch` sits above it at all times.
    OpenIf {
        branches: Vec<Branch>,
        tag: String,
        position: usize,
    },
    /// The branch currently collecting children; its finished nodes pile
    /// up above it on the stack.
    OpenBranch {
        guard: Option<Expression>,
        tag: String,
        position: usize,
    },
    /// A `{% loop %}` collecting children until `{% /loop %}`.
    OpenLoop {
        source: Expression,
        tag: String,
        position: usize,
    },
}

/// Which tag asked for the current branch to be closed. Decides the
/// error reported when no open branch exists.
#[derive(Clone, Copy, PartialEq)]
enum Trigger {
    Elif,
    Else,
    EndIf,
}

impl Trigger {
    fn name(self) -> &'static str {
        match self {
            Trigger::Elif => "elif",
            Trigger::Else => "else",
            Trigger::EndIf => "if",
        }
    }
}

/// Parse a token stream into a tree rooted at [`Node::Root`].
///
/// The stream is consumed; the tree keeps only what rendering needs.
pub fn parse(tokens: Vec<Token>) -> Result<Node, ParseError> {
    let mut stack: Vec<Entry> = Vec::new();
    for token in tokens {
        let Token {
            kind,
            text,
            position,
        } = token;
        match kind {
            TokenKind::Literal { text: content } => {
                stack.push(Entry::Finished(Node::Literal { text: content }));
            }
            TokenKind::Print { expression } => {
                stack.push(Entry::Finished(Node::Print { expression }));
            }
            TokenKind::BlockStart { name, expression } => {
                open_block(&mut stack, &name, expression, text, position)?;
            }
            TokenKind::BlockEnd { name } => {
                close_block(&mut stack, &name, text, position)?;
            }
        }
    }
    let mut children = Vec::with_capacity(stack.len());
    for entry in stack {
        match entry {
            Entry::Finished(node) => children.push(node),
            Entry::OpenIf { tag, position, .. } | Entry::OpenBranch { tag, position, .. } => {
                return Err(ParseError::UnclosedBlock {
                    name: "if".to_owned(),
                    tag,
                    position,
                });
            }
            Entry::OpenLoop { tag, position, .. } => {
                return Err(ParseError::UnclosedBlock {
                    name: "loop".to_owned(),
                    tag,
                    position,
                });
            }
        }
    }
    Ok(Node::Root { children })
}

fn open_block(
    stack: &mut Vec<Entry>,
    name: &str,
    expression: Option<Expression>,
    tag: String,
    position: usize,
) -> Result<(), ParseError> {
    match name {
        "if" => {
            let guard = require_expression(name, expression, &tag, position)?;
            stack.push(Entry::OpenIf {
                branches: Vec::new(),
                tag: tag.clone(),
                position,
            });
            stack.push(Entry::OpenBranch {
                guard: Some(guard),
                tag,
                position,
            });
            Ok(())
        }
        "elif" => {
            let guard = require_expression(name, expression, &tag, position)?;
            close_branch(stack, &tag, position, Trigger::Elif)?;
            stack.push(Entry::OpenBranch {
                guard: Some(guard),
                tag,
                position,
            });
            Ok(())
        }
        "else" => {
            if expression.is_some() {
                return Err(ParseError::StrayExpression { tag, position });
            }
            close_branch(stack, &tag, position, Trigger::Else)?;
            stack.push(Entry::OpenBranch {
                guard: None,
                tag,
                position,
            });
            Ok(())
        }
        "loop" => {
            let source = require_expression(name, expression, &tag, position)?;
            stack.push(Entry::OpenLoop {
                source,
                tag,
                position,
            });
            Ok(())
        }
        _ => Err(ParseError::UnknownBlockName {
            name: name.to_owned(),
            tag,
            position,
        }),
    }
}

fn close_block(
    stack: &mut Vec<Entry>,
    name: &str,
    tag: String,
    position: usize,
) -> Result<(), ParseError> {
    match name {
        "if" => {
            close_branch(stack, &tag, position, Trigger::EndIf)?;
            match stack.pop() {
                Some(Entry::OpenIf { branches, .. }) => {
                    stack.push(Entry::Finished(Node::Conditional { branches }));
                    Ok(())
                }
                // close_branch attached into the open if, so it is on top
                _ => Err(ParseError::UnexpectedEndTag {
                    name: "if".to_owned(),
                    tag,
                    position,
                }),
            }
        }
        "loop" => {
            let mut children = Vec::new();
            loop {
                match stack.pop() {
                    Some(Entry::Finished(node)) => children.push(node),
                    Some(Entry::OpenLoop { source, .. }) => {
                        children.reverse();
                        stack.push(Entry::Finished(Node::Loop { source, children }));
                        return Ok(());
                    }
                    Some(Entry::OpenIf { .. }) | Some(Entry::OpenBranch { .. }) => {
                        return Err(ParseError::MismatchedEndTag {
                            found: "loop".to_owned(),
                            open: "if".to_owned(),
                            tag,
                            position,
                        });
                    }
                    None => {
                        return Err(ParseError::UnexpectedEndTag {
                            name: "loop".to_owned(),
                            tag,
                            position,
                        });
                    }
                }
            }
        }
        "elif" | "else" => Err(ParseError::UnclosableBlock {
            name: name.to_owned(),
            tag,
            position,
        }),
        _ => Err(ParseError::UnknownBlockName {
            name: name.to_owned(),
            tag,
            position,
        }),
    }
}

/// Reduce finished nodes into the innermost open branch and attach the
/// closed branch to its `if` chain. Called for `elif`, `else`, and
/// `{% /if %}`; the caller pushes the next branch if there is one.
fn close_branch(
    stack: &mut Vec<Entry>,
    tag: &str,
    position: usize,
    trigger: Trigger,
) -> Result<(), ParseError> {
    let mut children = Vec::new();
    loop {
        match stack.pop() {
            Some(Entry::Finished(node)) => children.push(node),
            Some(Entry::OpenBranch { guard, .. }) => {
                if guard.is_none() && trigger != Trigger::EndIf {
                    return Err(ParseError::BranchAfterElse {
                        name: trigger.name().to_owned(),
                        tag: tag.to_owned(),
                        position,
                    });
                }
                children.reverse();
                let branch = Branch { guard, children };
                return match stack.last_mut() {
                    Some(Entry::OpenIf { branches, .. }) => {
                        branches.push(branch);
                        Ok(())
                    }
                    _ => Err(no_open_if(trigger, tag, position)),
                };
            }
            Some(Entry::OpenLoop { .. }) => {
                return Err(match trigger {
                    Trigger::EndIf => ParseError::MismatchedEndTag {
                        found: "if".to_owned(),
                        open: "loop".to_owned(),
                        tag: tag.to_owned(),
                        position,
                    },
                    Trigger::Elif | Trigger::Else => no_open_if(trigger, tag, position),
                });
            }
            Some(Entry::OpenIf { .. }) | None => {
                return Err(no_open_if(trigger, tag, position));
            }
        }
    }
}

fn no_open_if(trigger: Trigger, tag: &str, position: usize) -> ParseError {
    match trigger {
        Trigger::Elif | Trigger::Else => ParseError::DanglingBranch {
            name: trigger.name().to_owned(),
            tag: tag.to_owned(),
            position,
        },
        Trigger::EndIf => ParseError::UnexpectedEndTag {
            name: "if".to_owned(),
            tag: tag.to_owned(),
            position,
        },
    }
}

fn require_expression(
    name: &str,
    expression: Option<Expression>,
    tag: &str,
    position: usize,
) -> Result<Expression, ParseError> {
    expression.ok_or_else(|| ParseError::MissingExpression {
        name: name.to_owned(),
        tag: tag.to_owned(),
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curly::lexing::tokenize;

    fn parse_str(text: &str) -> Result<Node, ParseError> {
        parse(tokenize(text).unwrap())
    }

    fn expr(text: &str) -> Expression {
        Expression::parse(text).unwrap()
    }

    fn literal(text: &str) -> Node {
        Node::Literal {
            text: text.to_owned(),
        }
    }

    #[test]
    fn empty_input_parses_to_empty_root() {
        assert_eq!(parse_str("").unwrap(), Node::Root { children: vec![] });
    }

    #[test]
    fn flat_sequence_keeps_source_order() {
        let root = parse_str("a {{ x }} b").unwrap();
        assert_eq!(
            root,
            Node::Root {
                children: vec![
                    literal("a "),
                    Node::Print {
                        expression: expr("x")
                    },
                    literal(" b"),
                ]
            }
        );
    }

    #[test]
    fn if_chain_collects_branches_in_source_order() {
        let root = parse_str("{% if a %}x{% elif b %}y{% else %}z{% /if %}").unwrap();
        assert_eq!(
            root,
            Node::Root {
                children: vec![Node::Conditional {
                    branches: vec![
                        Branch {
                            guard: Some(expr("a")),
                            children: vec![literal("x")],
                        },
                        Branch {
                            guard: Some(expr("b")),
                            children: vec![literal("y")],
                        },
                        Branch {
                            guard: None,
                            children: vec![literal("z")],
                        },
                    ]
                }]
            }
        );
    }

    #[test]
    fn empty_branches_are_kept() {
        let root = parse_str("{% if a %}{% else %}{% /if %}").unwrap();
        assert_eq!(
            root,
            Node::Root {
                children: vec![Node::Conditional {
                    branches: vec![
                        Branch {
                            guard: Some(expr("a")),
                            children: vec![],
                        },
                        Branch {
                            guard: None,
                            children: vec![],
                        },
                    ]
                }]
            }
        );
    }

    #[test]
    fn loop_body_nests_under_the_loop() {
        let root = parse_str("{% loop xs %}-{{ item }}{% /loop %}").unwrap();
        assert_eq!(
            root,
            Node::Root {
                children: vec![Node::Loop {
                    source: expr("xs"),
                    children: vec![
                        literal("-"),
                        Node::Print {
                            expression: expr("item")
                        },
                    ],
                }]
            }
        );
    }

    #[test]
    fn nesting_reduces_innermost_first() {
        let root = parse_str("{% if a %}{% loop xs %}{% if b %}!{% /if %}{% /loop %}{% /if %}")
            .unwrap();
        let inner = Node::Conditional {
            branches: vec![Branch {
                guard: Some(expr("b")),
                children: vec![literal("!")],
            }],
        };
        assert_eq!(
            root,
            Node::Root {
                children: vec![Node::Conditional {
                    branches: vec![Branch {
                        guard: Some(expr("a")),
                        children: vec![Node::Loop {
                            source: expr("xs"),
                            children: vec![inner],
                        }],
                    }],
                }]
            }
        );
    }

    #[test]
    fn unknown_block_names_are_rejected() {
        assert!(matches!(
            parse_str("{% wibble x %}").unwrap_err(),
            ParseError::UnknownBlockName { name, .. } if name == "wibble"
        ));
        assert!(matches!(
            parse_str("{% /wibble %}").unwrap_err(),
            ParseError::UnknownBlockName { name, .. } if name == "wibble"
        ));
    }

    #[test]
    fn guarded_blocks_require_an_expression() {
        for (source, name) in [
            ("{% if %}x{% /if %}", "if"),
            ("{% if a %}{% elif %}{% /if %}", "elif"),
            ("{% loop %}x{% /loop %}", "loop"),
        ] {
            let err = parse_str(source).unwrap_err();
            assert!(
                matches!(&err, ParseError::MissingExpression { name: found, .. } if found == name),
                "source {source:?} gave: {err:?}"
            );
        }
    }

    #[test]
    fn else_takes_no_expression() {
        assert!(matches!(
            parse_str("{% if a %}{% else b %}{% /if %}").unwrap_err(),
            ParseError::StrayExpression { .. }
        ));
    }

    #[test]
    fn dangling_branches_are_rejected() {
        for source in [
            "{% elif x %}",
            "{% else %}",
            "{% loop xs %}{% else %}{% /loop %}",
            "{% loop xs %}{% elif x %}{% /loop %}",
        ] {
            let err = parse_str(source).unwrap_err();
            assert!(
                matches!(err, ParseError::DanglingBranch { .. }),
                "source {source:?} gave: {err:?}"
            );
        }
    }

    #[test]
    fn nothing_may_follow_the_else_branch() {
        assert!(matches!(
            parse_str("{% if a %}{% else %}{% else %}{% /if %}").unwrap_err(),
            ParseError::BranchAfterElse { name, .. } if name == "else"
        ));
        assert!(matches!(
            parse_str("{% if a %}{% else %}{% elif b %}{% /if %}").unwrap_err(),
            ParseError::BranchAfterElse { name, .. } if name == "elif"
        ));
    }

    #[test]
    fn branch_tags_take_no_end_tag() {
        assert!(matches!(
            parse_str("{% if a %}{% /elif %}{% /if %}").unwrap_err(),
            ParseError::UnclosableBlock { name, .. } if name == "elif"
        ));
        assert!(matches!(
            parse_str("{% /else %}").unwrap_err(),
            ParseError::UnclosableBlock { name, .. } if name == "else"
        ));
    }

    #[test]
    fn end_tags_need_an_open_block() {
        assert!(matches!(
            parse_str("x{% /if %}").unwrap_err(),
            ParseError::UnexpectedEndTag { name, .. } if name == "if"
        ));
        assert!(matches!(
            parse_str("{% /loop %}").unwrap_err(),
            ParseError::UnexpectedEndTag { name, .. } if name == "loop"
        ));
    }

    #[test]
    fn end_tags_must_match_the_innermost_block() {
        assert!(matches!(
            parse_str("{% if x %}{% /loop %}").unwrap_err(),
            ParseError::MismatchedEndTag { found, open, .. }
                if found == "loop" && open == "if"
        ));
        assert!(matches!(
            parse_str("{% loop xs %}{% /if %}").unwrap_err(),
            ParseError::MismatchedEndTag { found, open, .. }
                if found == "if" && open == "loop"
        ));
    }

    #[test]
    fn unclosed_blocks_are_reported_at_their_opener() {
        let err = parse_str("a{% if x %}b").unwrap_err();
        assert!(matches!(
            &err,
            ParseError::UnclosedBlock { name, position: 1, .. } if name == "if"
        ));
        assert!(matches!(
            parse_str("{% loop xs %}").unwrap_err(),
            ParseError::UnclosedBlock { name, .. } if name == "loop"
        ));
    }

    #[test]
    fn outermost_unclosed_block_wins() {
        assert!(matches!(
            parse_str("{% loop xs %}{% if x %}").unwrap_err(),
            ParseError::UnclosedBlock { name, position: 0, .. } if name == "loop"
        ));
    }
}
