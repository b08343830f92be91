//! Account routes: family circle management and account deletion.
//!
//! Every decision here runs against live relationship state loaded from the
//! repositories. The token's family snapshot is never consulted.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser, routes::error_response};
use hearth_core::family::{FamilyError, ResolveOutcome, plan_link_request, resolve_request};
use hearth_db::{FamilyRepository, UserRepository, entities::users};
use hearth_shared::AppError;

/// Creates the account router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account/family", get(get_family))
        .route("/account/family/request", post(request_family))
        .route("/account/family/resolve", post(resolve_family))
        .route("/account/family/{user_id}", delete(unlink_member))
        .route("/account", delete(delete_account))
}

/// Body for `POST /account/family/request`.
#[derive(Debug, Deserialize)]
struct FamilyRequestBody {
    /// Email of the identity to link with.
    email: String,
}

/// Body for `POST /account/family/resolve`.
#[derive(Debug, Deserialize)]
struct ResolveRequestBody {
    /// Email of the identity whose request is being resolved.
    email: String,
    /// `true` approves, `false` rejects.
    approve: bool,
}

fn family_error_response(err: &FamilyError) -> axum::response::Response {
    let (code, message) = match err {
        FamilyError::SelfLink => ("self_link", "You cannot add yourself as a family member"),
        FamilyError::AlreadyLinked => ("already_linked", "You are already family members"),
        FamilyError::RequestPending => ("request_pending", "A request is already pending"),
    };

    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": code, "message": message })),
    )
        .into_response()
}

fn member_json(user: &users::Model) -> serde_json::Value {
    json!({
        "id": user.id,
        "email": user.email,
        "display_name": user.display_name,
    })
}

/// POST /account/family/request - Ask another identity to share expenses.
///
/// Records a pending request on the target and notifies them by email. The
/// notification is fire-and-forget: a failed send is logged and never fails
/// the request itself.
async fn request_family(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<FamilyRequestBody>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());
    let family_repo = FamilyRepository::new((*state.db).clone());

    let target = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "not_found",
                    "message": "No account exists with that email"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error looking up family request target");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let target_state = match family_repo.relationship_state(target.id).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Database error loading relationship state");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    if let Err(e) = plan_link_request(&target_state, auth.user_id()) {
        return family_error_response(&e);
    }

    if let Err(e) = family_repo.add_request(target.id, auth.user_id()).await {
        error!(error = %e, "Failed to record family request");
        return error_response(&AppError::Persistence(e.to_string()));
    }

    info!(
        requester = %auth.user_id(),
        target = %target.id,
        "Family link requested"
    );

    let email_service = state.email_service.clone();
    let requester_name = auth.0.name.clone();
    tokio::spawn(async move {
        if let Err(e) = email_service
            .send_family_request_notice(&target.email, &target.display_name, &requester_name)
            .await
        {
            warn!(error = %e, "Failed to send family request notification");
        }
    });

    (StatusCode::OK, Json(json!({ "status": "requested" }))).into_response()
}

/// POST /account/family/resolve - Approve or reject a pending request.
///
/// Returns 200 on every branch: a request already resolved elsewhere (a
/// concurrent approve or reject) yields `already_resolved` rather than an
/// error.
async fn resolve_family(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ResolveRequestBody>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());
    let family_repo = FamilyRepository::new((*state.db).clone());

    let requester = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "not_found",
                    "message": "No account exists with that email"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error looking up requester");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let owner_state = match family_repo.relationship_state(auth.user_id()).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Database error loading relationship state");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let resolution = resolve_request(&owner_state, requester.id, payload.approve);

    let persisted = match resolution.outcome {
        ResolveOutcome::Approved => {
            family_repo
                .approve(auth.user_id(), requester.id, resolution.establish_link)
                .await
        }
        ResolveOutcome::Rejected => family_repo.reject(auth.user_id(), requester.id).await,
        ResolveOutcome::AlreadyResolved => Ok(()),
    };

    if let Err(e) = persisted {
        error!(error = %e, "Failed to persist family resolution");
        return error_response(&AppError::Persistence(e.to_string()));
    }

    let status = match resolution.outcome {
        ResolveOutcome::Approved => "approved",
        ResolveOutcome::Rejected => "rejected",
        ResolveOutcome::AlreadyResolved => "already_resolved",
    };

    info!(
        owner = %auth.user_id(),
        requester = %requester.id,
        status,
        "Family request resolved"
    );

    (StatusCode::OK, Json(json!({ "status": status }))).into_response()
}

/// GET /account/family - Current members and incoming pending requests.
async fn get_family(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());
    let family_repo = FamilyRepository::new((*state.db).clone());

    let relationship = match family_repo.relationship_state(auth.user_id()).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Database error loading relationship state");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let ids: Vec<Uuid> = relationship
        .members
        .iter()
        .chain(relationship.pending_requests.iter())
        .copied()
        .collect();

    let profiles = match user_repo.find_many(&ids).await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Database error loading family profiles");
            return error_response(&AppError::Persistence(e.to_string()));
        }
    };

    let members: Vec<serde_json::Value> = profiles
        .iter()
        .filter(|u| relationship.members.contains(&u.id))
        .map(member_json)
        .collect();

    let pending: Vec<serde_json::Value> = profiles
        .iter()
        .filter(|u| relationship.pending_requests.contains(&u.id))
        .map(member_json)
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "members": members,
            "pending_requests": pending,
        })),
    )
        .into_response()
}

/// DELETE /account/family/{user_id} - Remove a family member symmetrically.
///
/// Idempotent: unlinking an identity that is not a member still returns 200.
async fn unlink_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> impl IntoResponse {
    let family_repo = FamilyRepository::new((*state.db).clone());

    if let Err(e) = family_repo.unlink(auth.user_id(), user_id).await {
        error!(error = %e, "Failed to unlink family member");
        return error_response(&AppError::Persistence(e.to_string()));
    }

    info!(user = %auth.user_id(), member = %user_id, "Family member unlinked");

    (StatusCode::OK, Json(json!({ "status": "unlinked" }))).into_response()
}

/// DELETE /account - Delete the caller's account.
///
/// Foreign keys cascade: the identity disappears from every other identity's
/// links and pending requests, and its expenses are removed with it.
async fn delete_account(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.delete(auth.user_id()).await {
        Ok(true) => {
            info!(user = %auth.user_id(), "Account deleted");
            (StatusCode::OK, Json(json!({ "status": "deleted" }))).into_response()
        }
        Ok(false) => error_response(&AppError::NotFound("account".to_string())),
        Err(e) => {
            error!(error = %e, "Failed to delete account");
            error_response(&AppError::Persistence(e.to_string()))
        }
    }
}
