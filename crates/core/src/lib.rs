//! Core business logic for Hearth.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain decisions live here; persistence and HTTP are
//! collaborators that call in through these types.
//!
//! # Modules
//!
//! - `auth` - Password hashing
//! - `family` - Family relationship engine (links and pending requests)
//! - `expense` - Expense validation and visibility resolution

pub mod auth;
pub mod expense;
pub mod family;
