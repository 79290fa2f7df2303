// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for share expression evaluation.

/// A share expression could not be parsed or evaluated.
///
/// # Examples
///
/// ```rust
/// use balancescan::{evaluate_share, ShareExpressionError};
/// use bigdecimal::BigDecimal;
///
/// let err = evaluate_share("abc", &BigDecimal::from(1)).unwrap_err();
/// assert!(matches!(err, ShareExpressionError::InvalidCharacters { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareExpressionError {
    /// The expression contains characters outside `0-9 + - * / ( ) .` and `total`.
    #[error("Invalid share expression '{expression}': contains invalid characters")]
    InvalidCharacters {
        /// The rejected expression
        expression: String,
    },

    /// The expression is not a well-formed arithmetic expression.
    #[error("Invalid share expression '{expression}': {reason}")]
    InvalidSyntax {
        /// The rejected expression
        expression: String,
        /// What the parser expected
        reason: String,
    },

    /// Evaluation divided by zero.
    #[error("Invalid share expression '{expression}': division by zero")]
    DivisionByZero {
        /// The rejected expression
        expression: String,
    },
}

impl ShareExpressionError {
    pub(crate) fn syntax(expression: &str, reason: impl Into<String>) -> Self {
        ShareExpressionError::InvalidSyntax {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}
