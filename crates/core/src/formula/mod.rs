//! Restricted arithmetic formula evaluator.
//!
//! Formula expressions are arithmetic over named values: numeric literals,
//! identifiers, `+ - * /`, unary minus, and parentheses. Anything else is
//! rejected with a [`FormulaError`] before evaluation — the evaluator is
//! deliberately not a general-purpose interpreter, so submitted form values
//! can never smuggle code into a price calculation.
//!
//! Identifiers are resolved whole-token against a variable map, which also
//! guarantees that one parameter code can never partially match inside
//! another identifier.

mod lexer;
mod parser;

use std::collections::HashMap;

pub use lexer::Token;

/// An expression was rejected by the lexer, parser, or evaluator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    #[error("formula expression is empty")]
    Empty,

    #[error("invalid token '{0}' in formula")]
    InvalidToken(String),

    #[error("unknown identifier '{0}' in formula")]
    UnknownIdentifier(String),

    #[error("syntax error in formula: {0}")]
    Syntax(String),

    #[error("formula produced a non-finite result (division by zero?)")]
    NonFinite,
}

/// Result of evaluating a formula expression against a variable map.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The numeric result.
    pub value: f64,
    /// The expression with every identifier replaced by its numeric value,
    /// kept for display and audit.
    pub substituted: String,
}

/// Evaluate `expression` with identifiers resolved from `variables`.
///
/// Fails with [`FormulaError`] if the expression is empty, contains a token
/// outside the arithmetic grammar, references an identifier missing from
/// `variables`, is syntactically malformed, or produces a non-finite result.
pub fn evaluate(
    expression: &str,
    variables: &HashMap<String, f64>,
) -> Result<Evaluation, FormulaError> {
    let tokens = lexer::tokenize(expression)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let value = parser::evaluate(&tokens, variables)?;
    if !value.is_finite() {
        return Err(FormulaError::NonFinite);
    }

    Ok(Evaluation {
        value,
        substituted: render_substituted(&tokens, variables),
    })
}

/// Render the token stream with identifiers replaced by their values.
///
/// Only called after evaluation succeeded, so every identifier is known.
fn render_substituted(tokens: &[Token], variables: &HashMap<String, f64>) -> String {
    let parts: Vec<String> = tokens
        .iter()
        .map(|token| match token {
            Token::Number(n) => format_number(*n),
            Token::Ident(name) => variables
                .get(name)
                .map(|v| format_number(*v))
                .unwrap_or_else(|| name.clone()),
            Token::Plus => "+".into(),
            Token::Minus => "-".into(),
            Token::Star => "*".into(),
            Token::Slash => "/".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
        })
        .collect();
    parts.join(" ")
}

/// Format a value without a trailing `.0` for whole numbers.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn evaluates_plain_arithmetic() {
        let result = evaluate("2 + 3 * 4", &HashMap::new()).unwrap();
        assert_eq!(result.value, 14.0);
    }

    #[test]
    fn respects_parentheses() {
        let result = evaluate("(2 + 3) * 4", &HashMap::new()).unwrap();
        assert_eq!(result.value, 20.0);
    }

    #[test]
    fn resolves_identifiers_from_variable_map() {
        let variables = vars(&[("material_cost", 50.0), ("qty", 100.0), ("labor_cost", 100.0)]);
        let result = evaluate("material_cost * qty + labor_cost", &variables).unwrap();
        assert_eq!(result.value, 5100.0);
        assert_eq!(result.substituted, "50 * 100 + 100");
    }

    #[test]
    fn identifier_never_partially_matches_another() {
        // `cost` is defined but `material_cost` is not; whole-token
        // resolution must report the longer identifier as unknown instead
        // of substituting inside it.
        let variables = vars(&[("cost", 5.0)]);
        let err = evaluate("material_cost + 1", &variables).unwrap_err();
        assert_eq!(
            err,
            FormulaError::UnknownIdentifier("material_cost".into())
        );
    }

    #[test]
    fn unary_minus() {
        let variables = vars(&[("discount", 30.0)]);
        let result = evaluate("-discount + 100", &variables).unwrap();
        assert_eq!(result.value, 70.0);
    }

    #[test]
    fn rejects_empty_expression() {
        assert_eq!(evaluate("   ", &HashMap::new()).unwrap_err(), FormulaError::Empty);
    }

    #[test]
    fn rejects_disallowed_tokens() {
        for expr in ["1; drop table quotes", "a ** b", "foo(1)", "x = 2", "2 > 1"] {
            let variables = vars(&[("a", 1.0), ("b", 2.0), ("x", 3.0), ("foo", 4.0)]);
            assert!(
                matches!(
                    evaluate(expr, &variables),
                    Err(FormulaError::InvalidToken(_)) | Err(FormulaError::Syntax(_))
                ),
                "expression {expr:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_malformed_syntax() {
        for expr in ["1 +", "* 2", "(1 + 2", "1 2", "()"] {
            assert!(
                matches!(evaluate(expr, &HashMap::new()), Err(FormulaError::Syntax(_))),
                "expression {expr:?} should be a syntax error"
            );
        }
    }

    #[test]
    fn rejects_division_by_zero() {
        assert_eq!(
            evaluate("1 / 0", &HashMap::new()).unwrap_err(),
            FormulaError::NonFinite
        );
    }

    #[test]
    fn decimal_literals_and_values() {
        let variables = vars(&[("rate", 2.5)]);
        let result = evaluate("rate * 1.2", &variables).unwrap();
        assert!((result.value - 3.0).abs() < 1e-9);
        assert_eq!(result.substituted, "2.5 * 1.2");
    }
}
