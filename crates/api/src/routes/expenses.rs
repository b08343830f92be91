//! Expense routes: shared listing, creation, and owner-only mutation.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use hearth_core::expense::{
    ExpenseRecord, NewExpenseInput, OwnerProfile, annotate_and_sort, validate_expense_update,
    validate_new_expense, visible_owners,
};
use hearth_db::{
    ExpenseRepository, FamilyRepository, NewExpenseRow, UpdateExpenseRow, UserRepository,
    entities::{expenses, users},
};
use hearth_shared::AppError;

/// Creates the expenses router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{id}",
            patch(update_expense).delete(delete_expense),
        )
}

/// Body for `PATCH /expenses/{id}`; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
struct UpdateExpenseBody {
    amount: Option<rust_decimal::Decimal>,
    date: Option<chrono::NaiveDate>,
    category: Option<String>,
    currency: Option<String>,
    /// `Some(None)` clears the comment.
    #[serde(default, with = "double_option")]
    comment: Option<Option<String>>,
}

/// Distinguishes an absent `comment` key from an explicit `"comment": null`.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}

fn record_from_model(model: expenses::Model) -> ExpenseRecord {
    ExpenseRecord {
        id: model.id,
        owner_id: model.owner_id,
        amount: model.amount,
        date: model.date,
        category: model.category,
        currency: model.currency_code,
        comment: model.comment,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn profile_from_model(model: &users::Model) -> OwnerProfile {
    OwnerProfile {
        id: model.id,
        display_name: Some(model.display_name.clone()),
        email: model.email.clone(),
    }
}

/// GET /expenses - The caller's expenses plus their family's, newest first.
///
/// Visibility is resolved against live family membership on every call; a
/// token issued before an unlink sees the narrowed set immediately.
async fn list_expenses(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let family_repo = FamilyRepository::new((*state.db).clone());
    let expense_repo = ExpenseRepository::new((*state.db).clone());
    let user_repo = UserRepository::new((*state.db).clone());

    let members = match family_repo.members_of(auth.user_id()).await {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "Database error loading family members");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let owners = visible_owners(auth.user_id(), &members);
    let owner_ids: Vec<Uuid> = owners.iter().copied().collect();

    let rows = match expense_repo.list_for_owners(&owner_ids).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Database error listing expenses");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let profiles = match user_repo.find_many(&owner_ids).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Database error loading owner profiles");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let currencies = match expense_repo.list_currencies().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Database error listing currencies");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let records: Vec<ExpenseRecord> = rows.into_iter().map(record_from_model).collect();
    let owner_profiles: Vec<OwnerProfile> = profiles.iter().map(profile_from_model).collect();
    let annotated = annotate_and_sort(auth.user_id(), records, &owner_profiles);

    (
        StatusCode::OK,
        Json(json!({
            "expenses": annotated,
            "currencies": currencies,
        })),
    )
        .into_response()
}

/// POST /expenses - Record a new expense attributed to the caller.
///
/// The owner is always the authenticated caller; the request body carries no
/// owner field to spoof.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<NewExpenseInput>,
) -> impl IntoResponse {
    if let Err(e) = validate_new_expense(&payload) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    // Validation guarantees these fields are present.
    let (Some(amount), Some(date), Some(category), Some(currency)) = (
        payload.amount,
        payload.date,
        payload.category,
        payload.currency,
    ) else {
        return error_response(&AppError::Internal("validated input missing field".into()));
    };

    let expense_repo = ExpenseRepository::new((*state.db).clone());
    let row = NewExpenseRow {
        owner_id: auth.user_id(),
        amount,
        date,
        category,
        currency_code: currency,
        comment: payload.comment,
    };

    match expense_repo.create(row).await {
        Ok(model) => {
            info!(expense_id = %model.id, owner = %auth.user_id(), "Expense recorded");
            (StatusCode::OK, Json(record_from_model(model))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create expense");
            error_response(&AppError::Persistence(e.to_string()))
        }
    }
}

/// PATCH /expenses/{id} - Update an expense the caller owns.
///
/// A family member's expense is readable but never mutable: for mutation it
/// does not exist, so the response is 404.
async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseBody>,
) -> impl IntoResponse {
    if let Err(e) = validate_expense_update(
        payload.amount,
        payload.category.as_deref(),
        payload.currency.as_deref(),
    ) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    let expense_repo = ExpenseRepository::new((*state.db).clone());
    let changes = UpdateExpenseRow {
        amount: payload.amount,
        date: payload.date,
        category: payload.category,
        currency_code: payload.currency,
        comment: payload.comment,
    };

    match expense_repo.update_own(id, auth.user_id(), changes).await {
        Ok(Some(model)) => {
            info!(expense_id = %id, owner = %auth.user_id(), "Expense updated");
            (StatusCode::OK, Json(record_from_model(model))).into_response()
        }
        Ok(None) => error_response(&AppError::NotFound("expense".to_string())),
        Err(e) => {
            error!(error = %e, "Failed to update expense");
            error_response(&AppError::Persistence(e.to_string()))
        }
    }
}

/// DELETE /expenses/{id} - Delete an expense the caller owns.
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let expense_repo = ExpenseRepository::new((*state.db).clone());

    match expense_repo.delete_own(id, auth.user_id()).await {
        Ok(true) => {
            info!(expense_id = %id, owner = %auth.user_id(), "Expense deleted");
            (StatusCode::OK, Json(json!({ "status": "deleted" }))).into_response()
        }
        Ok(false) => error_response(&AppError::NotFound("expense".to_string())),
        Err(e) => {
            error!(error = %e, "Failed to delete expense");
            error_response(&AppError::Persistence(e.to_string()))
        }
    }
}
