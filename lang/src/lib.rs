// bivarcontours-lang/src/lib.rs
// Formula language: x, y, numeric literals, + - * / ** and parentheses.
//
// - lexer: text -> tokens
// - parser: tokens -> immutable arena tree (unary minus lowered to -1 * operand)
// - propagate: tree + variable dimensions -> result dimension

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod propagate;

pub use ast::{BinOp, Formula, Node, NodeId, Var};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{parse_with_limits, Parser};
pub use propagate::{combine_dimension, propagate, rational_exponent};

use bivarcontours_core::{ContourError, Limits};

/// Convenience: formula text -> tree under default limits.
pub fn parse(source: &str) -> Result<Formula, ContourError> {
    parse_with_limits(source, &Limits::default())
}
