// lang/src/parser.rs
// Recursive descent over the token stream.
//
//   expr    := term (('+' | '-') term)*
//   term    := unary (('*' | '/') unary)*
//   unary   := ('-' | '+') unary | power
//   power   := primary ('**' unary)?
//   primary := NUMBER | 'x' | 'y' | '(' expr ')'

use bivarcontours_core::{ContourError, Limits};
use tracing::trace;

use crate::ast::{BinOp, Formula, Node, NodeId, Var};
use crate::lexer::{Lexer, Token, TokenKind};

pub struct Parser<'l> {
    tokens: Vec<Token>,
    pos: usize,
    nodes: Vec<Node>,
    nesting: usize,
    limits: &'l Limits,
}

impl<'l> Parser<'l> {
    pub fn new(tokens: Vec<Token>, limits: &'l Limits) -> Self {
        Self {
            tokens,
            pos: 0,
            nodes: Vec::new(),
            nesting: 0,
            limits,
        }
    }

    pub fn parse_formula(mut self, source: &str) -> Result<Formula, ContourError> {
        if matches!(self.peek_kind(), TokenKind::Eof) {
            return Err(ContourError::FormulaSyntax {
                pos: 0,
                message: "empty formula".to_string(),
            });
        }
        let root = self.parse_expr()?;
        if !matches!(self.peek_kind(), TokenKind::Eof) {
            let token = self.peek().clone();
            return Err(self.unexpected(&token, "end of formula"));
        }
        let formula = Formula::from_parts(self.nodes, root, source.to_string());
        let depth = formula.depth();
        if depth > self.limits.max_depth {
            return Err(ContourError::limit("max_depth", depth, self.limits.max_depth));
        }
        trace!(nodes = formula.len(), depth, "formula parsed");
        Ok(formula)
    }

    fn parse_expr(&mut self) -> Result<NodeId, ContourError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = self.push(Node::Binary { op, left, right })?;
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<NodeId, ContourError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.push(Node::Binary { op, left, right })?;
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeId, ContourError> {
        self.nesting += 1;
        if self.nesting > self.limits.max_depth {
            return Err(ContourError::limit(
                "max_depth",
                self.nesting,
                self.limits.max_depth,
            ));
        }
        let result = match self.peek_kind() {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary()?;
                self.negate(operand)
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        };
        self.nesting -= 1;
        result
    }

    fn parse_power(&mut self) -> Result<NodeId, ContourError> {
        let base = self.parse_primary()?;
        if matches!(self.peek_kind(), TokenKind::StarStar) {
            self.advance();
            let exponent = self.parse_unary()?;
            return self.push(Node::Binary {
                op: BinOp::Pow,
                left: base,
                right: exponent,
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<NodeId, ContourError> {
        let token = self.advance();
        match &token.kind {
            TokenKind::Number(value) => self.push(Node::Literal(*value)),
            TokenKind::Ident(name) => {
                if matches!(self.peek_kind(), TokenKind::LParen) {
                    return Err(ContourError::UnsupportedOperator {
                        op: format!("function call `{}(...)`", name),
                    });
                }
                let var = match name.as_str() {
                    "x" => Var::X,
                    "y" => Var::Y,
                    _ => {
                        return Err(ContourError::UnknownVariable {
                            name: name.clone(),
                            pos: token.span.start,
                        })
                    }
                };
                self.push(Node::Var(var))
            }
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                match self.peek_kind() {
                    TokenKind::RParen => {
                        self.advance();
                        Ok(inner)
                    }
                    _ => {
                        let next = self.peek().clone();
                        Err(self.unexpected(&next, "`)`"))
                    }
                }
            }
            TokenKind::Unsupported(op) => Err(unsupported(op)),
            _ => Err(self.unexpected(&token, "a number, `x`, `y` or `(`")),
        }
    }

    /// Unary minus becomes `-1 * operand`; a literal operand folds directly.
    fn negate(&mut self, operand: NodeId) -> Result<NodeId, ContourError> {
        if let Node::Literal(value) = self.nodes[operand] {
            self.nodes[operand] = Node::Literal(-value);
            return Ok(operand);
        }
        let minus_one = self.push(Node::Literal(-1.0))?;
        self.push(Node::Binary {
            op: BinOp::Mul,
            left: minus_one,
            right: operand,
        })
    }

    fn push(&mut self, node: Node) -> Result<NodeId, ContourError> {
        if self.nodes.len() >= self.limits.max_nodes {
            return Err(ContourError::limit(
                "max_nodes",
                self.nodes.len() + 1,
                self.limits.max_nodes,
            ));
        }
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    fn unexpected(&self, token: &Token, expected: &str) -> ContourError {
        if let TokenKind::Unsupported(op) = &token.kind {
            return unsupported(op);
        }
        let found = match &token.kind {
            TokenKind::Eof => "end of formula".to_string(),
            TokenKind::Number(value) => format!("number `{}`", value),
            TokenKind::Ident(name) => format!("identifier `{}`", name),
            other => format!("`{}`", token_text(other)),
        };
        ContourError::FormulaSyntax {
            pos: token.span.start,
            message: format!("expected {}, found {}", expected, found),
        }
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }
}

fn unsupported(op: &str) -> ContourError {
    let op = match op {
        "^" => "`^` (use `**` for powers)".to_string(),
        other => format!("`{}`", other),
    };
    ContourError::UnsupportedOperator { op }
}

fn token_text(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::StarStar => "**",
        TokenKind::Slash => "/",
        TokenKind::LParen => "(",
        TokenKind::RParen => ")",
        _ => "?",
    }
}

/// Parses formula text under the given limits.
pub fn parse_with_limits(source: &str, limits: &Limits) -> Result<Formula, ContourError> {
    if source.len() > limits.max_formula_len {
        return Err(ContourError::limit(
            "max_formula_len",
            source.len(),
            limits.max_formula_len,
        ));
    }
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens, limits).parse_formula(source)
}
