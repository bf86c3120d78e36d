//! Tokenizer for the arithmetic formula grammar.

use super::FormulaError;

/// A single lexical token of the formula grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Split `expression` into tokens, rejecting anything outside the grammar.
///
/// Identifiers are `[A-Za-z_][A-Za-z0-9_]*`; numbers are decimal literals
/// with an optional fractional part. Whitespace separates tokens and is
/// otherwise ignored.
pub fn tokenize(expression: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        literal.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = literal
                    .parse()
                    .map_err(|_| FormulaError::InvalidToken(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(FormulaError::InvalidToken(other.to_string())),
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_mixed_expression() {
        let tokens = tokenize("base_cost * (qty + 2.5)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("base_cost".into()),
                Token::Star,
                Token::LParen,
                Token::Ident("qty".into()),
                Token::Plus,
                Token::Number(2.5),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn rejects_foreign_characters() {
        assert_eq!(tokenize("1 ; 2").unwrap_err(), FormulaError::InvalidToken(";".into()));
        assert_eq!(tokenize("a % b").unwrap_err(), FormulaError::InvalidToken("%".into()));
    }

    #[test]
    fn rejects_malformed_number() {
        assert_eq!(
            tokenize("1.2.3").unwrap_err(),
            FormulaError::InvalidToken("1.2.3".into())
        );
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").unwrap().is_empty());
    }
}
