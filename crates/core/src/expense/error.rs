//! Expense error types.

use thiserror::Error;

/// Errors from expense validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExpenseError {
    /// A required field is absent or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Amount must be greater than zero.
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
}
