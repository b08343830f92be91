//! Authentication primitives.
//!
//! Only password hashing lives here; token issuance is a shared concern
//! (see `hearth-shared::jwt`).

mod password;

pub use password::{PasswordError, hash_password, verify_password};
