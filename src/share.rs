// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Share expressions
//!
//! A share expression describes which part of a group's summed balance is
//! reported, written as arithmetic over the keyword `total`:
//!
//! - `total` reports the whole sum
//! - `0.5total` reports half of it (`0.5*total`)
//! - `2(total - 100)` doubles what exceeds 100 (`2*(total-100)`)
//!
//! The language is closed. Only decimal literals, `total`, parentheses, the four
//! binary operators and unary sign are accepted. Names other than `total`,
//! function calls and exponents are rejected. Evaluation uses exact decimal
//! arithmetic.
//!
//! Implicit multiplication is inserted only where a number or `)` is written
//! directly against `(` or `total`, without whitespace in between.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};

use crate::errors::ShareExpressionError;

const TOTAL: &str = "total";

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(BigDecimal),
    Total,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{value}"),
            Token::Total => f.write_str(TOTAL),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

/// Syntax tree after `total` has been replaced by its value.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Literal(BigDecimal),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
}

/// A validated share expression.
///
/// Parsing checks characters and syntax without needing a total, so
/// configuration can be validated before any balance is known.
///
/// # Examples
///
/// ```
/// use balancescan::ShareExpression;
/// use bigdecimal::BigDecimal;
///
/// let share = ShareExpression::parse("2(total-100)").unwrap();
/// assert_eq!(share.evaluate(&BigDecimal::from(150)).unwrap(), BigDecimal::from(100));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ShareExpression {
    source: String,
    tokens: Vec<Token>,
}

impl ShareExpression {
    /// Validate `expression`.
    ///
    /// # Errors
    ///
    /// [`ShareExpressionError::InvalidCharacters`] for anything outside
    /// `0-9 + - * / ( ) .`, whitespace and `total`;
    /// [`ShareExpressionError::InvalidSyntax`] for malformed arithmetic.
    pub fn parse(expression: &str) -> Result<Self, ShareExpressionError> {
        let tokens = tokenize(expression)?;
        // Syntax does not depend on the value of `total`.
        Parser::new(expression, substitute(&tokens, &BigDecimal::zero())).parse()?;
        Ok(Self {
            source: expression.to_string(),
            tokens,
        })
    }

    /// The expression as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the expression is exactly `total`.
    pub fn is_identity(&self) -> bool {
        self.tokens == [Token::Total]
    }

    /// Evaluate with `total` bound to `total`.
    ///
    /// # Errors
    ///
    /// [`ShareExpressionError::DivisionByZero`] when a divisor evaluates to zero.
    pub fn evaluate(&self, total: &BigDecimal) -> Result<BigDecimal, ShareExpressionError> {
        let expr = Parser::new(&self.source, substitute(&self.tokens, total)).parse()?;
        eval(&expr, &self.source)
    }
}

impl FromStr for ShareExpression {
    type Err = ShareExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ShareExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse and evaluate `expression` against `total` in one step.
///
/// # Examples
///
/// ```
/// use balancescan::evaluate_share;
/// use bigdecimal::BigDecimal;
///
/// let value = evaluate_share("0.5total", &BigDecimal::from(100)).unwrap();
/// assert_eq!(value, BigDecimal::from(50));
/// ```
pub fn evaluate_share(
    expression: &str,
    total: &BigDecimal,
) -> Result<BigDecimal, ShareExpressionError> {
    ShareExpression::parse(expression)?.evaluate(total)
}

fn invalid_characters(expression: &str) -> ShareExpressionError {
    ShareExpressionError::InvalidCharacters {
        expression: expression.to_string(),
    }
}

fn tokenize(expression: &str) -> Result<Vec<Token>, ShareExpressionError> {
    let bytes = expression.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut after_space = true;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            after_space = true;
            pos += 1;
            continue;
        }

        let glued = !after_space;
        after_space = false;

        let token = if c.is_ascii_digit() || c == b'.' {
            let start = pos;
            while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                pos += 1;
            }
            let literal = &expression[start..pos];
            let value = BigDecimal::from_str(literal).map_err(|_| {
                ShareExpressionError::syntax(expression, format!("invalid number '{literal}'"))
            })?;
            Token::Number(value)
        } else if c.is_ascii_alphabetic() {
            let start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_alphanumeric() {
                pos += 1;
            }
            if &expression[start..pos] != TOTAL {
                return Err(invalid_characters(expression));
            }
            Token::Total
        } else {
            pos += 1;
            match c {
                b'+' => Token::Plus,
                b'-' => Token::Minus,
                b'*' => Token::Star,
                b'/' => Token::Slash,
                b'(' => Token::LParen,
                b')' => Token::RParen,
                _ => return Err(invalid_characters(expression)),
            }
        };

        let implicit = glued
            && matches!(token, Token::LParen | Token::Total)
            && matches!(tokens.last(), Some(Token::Number(_) | Token::RParen));
        if implicit {
            tokens.push(Token::Star);
        }
        tokens.push(token);
    }

    Ok(tokens)
}

/// Replace every `total` with `(value)`.
fn substitute(tokens: &[Token], total: &BigDecimal) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len() + 2);
    for token in tokens {
        if *token == Token::Total {
            result.push(Token::LParen);
            result.push(Token::Number(total.clone()));
            result.push(Token::RParen);
        } else {
            result.push(token.clone());
        }
    }
    result
}

struct Parser<'a> {
    expression: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(expression: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            expression,
            tokens,
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Expr, ShareExpressionError> {
        if self.tokens.is_empty() {
            return Err(ShareExpressionError::syntax(self.expression, "empty expression"));
        }
        let expr = self.sum()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(self.unexpected(token)),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn unexpected(&self, token: &Token) -> ShareExpressionError {
        ShareExpressionError::syntax(self.expression, format!("unexpected '{token}'"))
    }

    fn sum(&mut self) -> Result<Expr, ShareExpressionError> {
        let mut lhs = self.product()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    lhs = Expr::Add(Box::new(lhs), Box::new(self.product()?));
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(self.product()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn product(&mut self) -> Result<Expr, ShareExpressionError> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(self.unary()?));
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    lhs = Expr::Div(Box::new(lhs), Box::new(self.unary()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, ShareExpressionError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, ShareExpressionError> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Expr::Literal(value)),
            Some(Token::LParen) => {
                let inner = self.sum()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(token) => Err(self.unexpected(&token)),
                    None => Err(ShareExpressionError::syntax(self.expression, "missing ')'")),
                }
            }
            Some(token) => Err(self.unexpected(&token)),
            None => Err(ShareExpressionError::syntax(
                self.expression,
                "unexpected end of expression",
            )),
        }
    }
}

fn eval(expr: &Expr, expression: &str) -> Result<BigDecimal, ShareExpressionError> {
    Ok(match expr {
        Expr::Literal(value) => value.clone(),
        Expr::Neg(inner) => -eval(inner, expression)?,
        Expr::Add(lhs, rhs) => eval(lhs, expression)? + eval(rhs, expression)?,
        Expr::Sub(lhs, rhs) => eval(lhs, expression)? - eval(rhs, expression)?,
        Expr::Mul(lhs, rhs) => eval(lhs, expression)? * eval(rhs, expression)?,
        Expr::Div(lhs, rhs) => {
            let divisor = eval(rhs, expression)?;
            if divisor.is_zero() {
                return Err(ShareExpressionError::DivisionByZero {
                    expression: expression.to_string(),
                });
            }
            eval(lhs, expression)? / divisor
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn eval_at(expression: &str, total: i64) -> BigDecimal {
        evaluate_share(expression, &BigDecimal::from(total)).unwrap()
    }

    #[test]
    fn test_identity() {
        assert_eq!(evaluate_share("total", &dec("123.456")).unwrap(), dec("123.456"));
        assert!(ShareExpression::parse("total").unwrap().is_identity());
        assert!(!ShareExpression::parse("total*1").unwrap().is_identity());
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(eval_at("0.5total", 100), BigDecimal::from(50));
        assert_eq!(eval_at("2(total-100)", 150), BigDecimal::from(100));
        assert_eq!(eval_at("(1+1)(total)", 4), BigDecimal::from(8));
        assert_eq!(eval_at("(2)total", 4), BigDecimal::from(8));
    }

    #[test]
    fn test_negative_result() {
        assert_eq!(eval_at("total-1000", 500), BigDecimal::from(-500));
    }

    #[test]
    fn test_negative_total_is_parenthesized() {
        // -(-5) would be wrong without parentheses around the substituted value
        assert_eq!(eval_at("-total", -5), BigDecimal::from(5));
        assert_eq!(eval_at("total*total", -3), BigDecimal::from(9));
    }

    #[test]
    fn test_precedence_and_unary() {
        assert_eq!(eval_at("1 + 2 * 3", 0), BigDecimal::from(7));
        assert_eq!(eval_at("(1 + 2) * 3", 0), BigDecimal::from(9));
        assert_eq!(eval_at("-(total) + +2", 1), BigDecimal::from(1));
        assert_eq!(eval_at("10 - 4 - 3", 0), BigDecimal::from(3));
        assert_eq!(eval_at("total / 4", 10), dec("2.5"));
    }

    #[test]
    fn test_exact_decimal_arithmetic() {
        assert_eq!(evaluate_share("0.1 + 0.2", &BigDecimal::zero()).unwrap(), dec("0.3"));
    }

    #[test]
    fn test_invalid_characters() {
        for expression in ["abc", "totals", "total + x", "2^3", "total % 2", "os.system"] {
            let err = evaluate_share(expression, &BigDecimal::from(1)).unwrap_err();
            assert!(
                matches!(err, ShareExpressionError::InvalidCharacters { .. }),
                "{expression}: {err}"
            );
        }
    }

    #[test]
    fn test_invalid_syntax() {
        for expression in ["", "   ", "total ** 2", "total(2)", "(total", "total)", "1..2", "*total", "total total", "2 (total)"] {
            let err = ShareExpression::parse(expression).unwrap_err();
            assert!(
                matches!(err, ShareExpressionError::InvalidSyntax { .. }),
                "{expression}: {err}"
            );
        }
    }

    #[test]
    fn test_division_by_zero() {
        let share = ShareExpression::parse("100 / total").unwrap();
        assert_eq!(share.evaluate(&BigDecimal::from(4)).unwrap(), BigDecimal::from(25));
        assert!(matches!(
            share.evaluate(&BigDecimal::zero()),
            Err(ShareExpressionError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_display_keeps_source() {
        let share: ShareExpression = "0.5 total".parse().unwrap();
        assert_eq!(share.to_string(), "0.5 total");
        assert_eq!(share.as_str(), "0.5 total");
    }

    proptest! {
        #[test]
        fn prop_identity(units in any::<i64>(), scale in 0i64..=18) {
            let total = BigDecimal::new(units.into(), scale);
            prop_assert_eq!(evaluate_share("total", &total).unwrap(), total);
        }

        #[test]
        fn prop_linear_expressions(units in any::<i32>(), scale in 0i64..=8) {
            let total = BigDecimal::new(units.into(), scale);
            let doubled = evaluate_share("2total - total", &total).unwrap();
            prop_assert_eq!(doubled, total.clone());
            let shifted = evaluate_share("(total + 1000) - 1000", &total).unwrap();
            prop_assert_eq!(shifted, total);
        }

        #[test]
        fn prop_rejects_other_letters(name in "[a-z]{1,8}") {
            prop_assume!(name != "total");
            let err = evaluate_share(&name, &BigDecimal::from(1)).unwrap_err();
            let is_invalid_characters = matches!(err, ShareExpressionError::InvalidCharacters { .. });
            prop_assert!(is_invalid_characters);
        }
    }
}
