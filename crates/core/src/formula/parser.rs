//! Recursive-descent evaluator for the arithmetic formula grammar.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := NUMBER | IDENT | '-' factor | '(' expr ')'
//! ```

use std::collections::HashMap;

use super::{FormulaError, Token};

/// Evaluate a token stream, resolving identifiers from `variables`.
pub fn evaluate(tokens: &[Token], variables: &HashMap<String, f64>) -> Result<f64, FormulaError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        variables,
    };
    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(FormulaError::Syntax(format!(
            "unexpected token {token:?} after expression"
        ))),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    variables: &'a HashMap<String, f64>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    // Returned reference borrows the token slice, not the parser, so the
    // caller can keep it across further parser calls.
    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn expr(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.advance();
                    value += self.term()?;
                }
                Token::Minus => {
                    self.advance();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.advance();
                    value *= self.factor()?;
                }
                Token::Slash => {
                    self.advance();
                    value /= self.factor()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, FormulaError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::Ident(name)) => self
                .variables
                .get(name)
                .copied()
                .ok_or_else(|| FormulaError::UnknownIdentifier(name.clone())),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(FormulaError::Syntax("missing closing parenthesis".into())),
                }
            }
            Some(other) => Err(FormulaError::Syntax(format!(
                "unexpected token {other:?}"
            ))),
            None => Err(FormulaError::Syntax("unexpected end of expression".into())),
        }
    }
}
