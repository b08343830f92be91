//! Expense validation and visibility resolution.
//!
//! The visibility set (self plus approved family members) is the sole
//! authorization boundary for reading expenses. It is always computed from
//! live relationship state; the login-time token snapshot never authorizes.

mod error;
mod resolver;
mod types;

pub use error::ExpenseError;
pub use resolver::{
    annotate_and_sort, owner_label, validate_expense_update, validate_new_expense, visible_owners,
};
pub use types::{AnnotatedExpense, ExpenseRecord, NewExpenseInput, OwnerProfile};
