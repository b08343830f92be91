//! Shared types, errors, and configuration for Hearth.
//!
//! This crate provides common types used across all other crates:
//! - JWT claims and token issuance
//! - Authentication request/response payloads
//! - Application-wide error types
//! - Configuration management
//! - Outbound email service

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;

pub use auth::Claims;
pub use config::{AppConfig, EmailConfig};
pub use email::EmailService;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
