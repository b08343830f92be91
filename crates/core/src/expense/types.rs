//! Expense data types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input for recording a new expense, before validation.
///
/// Fields arrive as options because callers submit forms; validation turns
/// absent or blank fields into errors. No owner field exists here: the new
/// record is always attributed to the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpenseInput {
    /// Amount spent.
    pub amount: Option<Decimal>,
    /// Date of the expense.
    pub date: Option<NaiveDate>,
    /// Spending category.
    pub category: Option<String>,
    /// Currency code (ISO 4217).
    pub currency: Option<String>,
    /// Optional free-text comment.
    pub comment: Option<String>,
}

/// A persisted expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Expense ID.
    pub id: Uuid,
    /// Owning identity; immutable once attributed.
    pub owner_id: Uuid,
    /// Amount spent.
    pub amount: Decimal,
    /// Date of the expense.
    pub date: NaiveDate,
    /// Spending category.
    pub category: String,
    /// Currency code (ISO 4217).
    pub currency: String,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Minimal owner profile used for expense attribution labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerProfile {
    /// Identity ID.
    pub id: Uuid,
    /// Display name, if the profile has one.
    pub display_name: Option<String>,
    /// Email address (label fallback).
    pub email: String,
}

/// An expense annotated with its owner's display label.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedExpense {
    /// The expense record.
    #[serde(flatten)]
    pub expense: ExpenseRecord,
    /// `"Me"` for the viewer's own expenses, else the owner's name or email.
    pub owner_label: String,
}
