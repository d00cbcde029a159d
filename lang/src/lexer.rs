// lang/src/lexer.rs
use bivarcontours_core::ContourError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    LParen,
    RParen,
    /// Lexed so the parser can name it; never valid in a formula.
    Unsupported(String),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ContourError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_ws();
            let start = self.offset();
            let Some(ch) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(start, start),
                });
                break;
            };
            let kind = match ch {
                '0'..='9' | '.' => self.read_number()?,
                c if c.is_alphabetic() || c == '_' => self.read_ident(),
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => {
                    self.pos += 1;
                    if self.peek() == Some('*') {
                        self.pos += 1;
                        TokenKind::StarStar
                    } else {
                        TokenKind::Star
                    }
                }
                '/' => {
                    self.pos += 1;
                    if self.peek() == Some('/') {
                        self.pos += 1;
                        TokenKind::Unsupported("//".to_string())
                    } else {
                        TokenKind::Slash
                    }
                }
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '^' | '%' | ',' | '=' | '<' | '>' | '&' | '|' | '!' | '~' | '@' => {
                    self.pos += 1;
                    TokenKind::Unsupported(ch.to_string())
                }
                _ => {
                    return Err(ContourError::FormulaSyntax {
                        pos: start,
                        message: format!("unexpected character `{}`", ch),
                    });
                }
            };
            tokens.push(Token {
                kind,
                span: Span::new(start, self.offset()),
            });
        }
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn read_number(&mut self) -> Result<TokenKind, ContourError> {
        let start = self.offset();
        self.eat_digits();
        if self.peek() == Some('.') {
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let save = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.eat_digits();
            } else {
                // `2e` is not an exponent; leave `e` for the identifier rule
                self.pos = save;
            }
        }
        let text = &self.source[start..self.offset()];
        let value: f64 = text.parse().map_err(|_| ContourError::FormulaSyntax {
            pos: start,
            message: format!("bad number `{}`", text),
        })?;
        if !value.is_finite() {
            return Err(ContourError::FormulaSyntax {
                pos: start,
                message: format!("number `{}` is out of range", text),
            });
        }
        Ok(TokenKind::Number(value))
    }

    fn eat_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn read_ident(&mut self) -> TokenKind {
        let start = self.offset();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        TokenKind::Ident(self.source[start..self.offset()].to_string())
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    /// Byte offset of the current char, or the source length at the end.
    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or(self.source.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn power_is_one_token() {
        assert_eq!(
            kinds("x**2"),
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::StarStar,
                TokenKind::Number(2.0),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn numbers_accept_decimal_and_exponent_forms() {
        assert_eq!(kinds(".5")[0], TokenKind::Number(0.5));
        assert_eq!(kinds("1e-3")[0], TokenKind::Number(1e-3));
        assert_eq!(kinds("2.5E2")[0], TokenKind::Number(250.0));
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(kinds("  x\t+\ny "), kinds("x+y"));
    }

    #[test]
    fn caret_is_lexed_as_unsupported() {
        assert_eq!(kinds("x^2")[1], TokenKind::Unsupported("^".to_string()));
        assert_eq!(kinds("x//y")[1], TokenKind::Unsupported("//".to_string()));
    }

    #[test]
    fn non_ascii_letters_form_identifiers() {
        assert_eq!(
            kinds("é + xλ2"),
            vec![
                TokenKind::Ident("é".to_string()),
                TokenKind::Plus,
                TokenKind::Ident("xλ2".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn stray_character_is_syntax_error() {
        let err = Lexer::new("x + $").tokenize().expect_err("bad char");
        assert_eq!(
            err,
            ContourError::FormulaSyntax {
                pos: 4,
                message: "unexpected character `$`".to_string()
            }
        );
    }

    #[test]
    fn lone_dot_is_bad_number() {
        let err = Lexer::new("x * .").tokenize().expect_err("dot");
        assert_eq!(err.code(), "E_FORMULA_SYNTAX");
    }
}
