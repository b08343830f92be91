//! Authentication types: JWT claims and request/response payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Snapshot of an identity at token-issuance time.
///
/// The `family` field is a login-time snapshot of approved family member IDs.
/// It is informational only: authorization always re-reads live relationship
/// state, so a stale snapshot can never widen (or narrow) visibility.
#[derive(Debug, Clone)]
pub struct IdentitySnapshot {
    /// Identity ID.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Approved family member IDs at issuance time.
    pub family: Vec<Uuid>,
    /// Category preferences.
    pub categories: Vec<String>,
}

/// JWT claims for access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity ID).
    pub sub: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Family member IDs snapshot (identification context, never authorization).
    pub family: Vec<Uuid>,
    /// Category preferences snapshot.
    pub categories: Vec<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims from an identity snapshot.
    #[must_use]
    pub fn new(identity: &IdentitySnapshot, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: identity.id,
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            family: identity.family.clone(),
            categories: identity.categories.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the identity ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Login request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// User email.
    #[validate(email)]
    pub email: String,
    /// User password.
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 120))]
    pub display_name: String,
}

/// Login response payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

/// User info returned in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    /// Identity ID.
    pub id: Uuid,
    /// Email address.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// Approved family member IDs at login time.
    pub family: Vec<Uuid>,
}

/// Refresh token request.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token.
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn snapshot() -> IdentitySnapshot {
        IdentitySnapshot {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            display_name: "Alice".to_string(),
            family: vec![Uuid::new_v4()],
            categories: vec!["food".to_string()],
        }
    }

    #[test]
    fn test_claims_carry_identity_snapshot() {
        let identity = snapshot();
        let claims = Claims::new(&identity, Utc::now() + chrono::Duration::minutes(15));

        assert_eq!(claims.user_id(), identity.id);
        assert_eq!(claims.email, identity.email);
        assert_eq!(claims.family, identity.family);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_register_request_rejects_short_password() {
        let payload = RegisterRequest {
            email: "bob@example.com".to_string(),
            password: "short".to_string(),
            display_name: "Bob".to_string(),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let payload = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "long-enough-password".to_string(),
            display_name: "Bob".to_string(),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_register_request_accepts_valid_payload() {
        let payload = RegisterRequest {
            email: "bob@example.com".to_string(),
            password: "long-enough-password".to_string(),
            display_name: "Bob".to_string(),
        };
        assert!(payload.validate().is_ok());
    }
}
