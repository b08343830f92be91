//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every relationship-graph mutation is a read-modify-write
//! sequence executed as a transaction.

pub mod expense;
pub mod family;
pub mod user;

pub use expense::{ExpenseRepository, NewExpenseRow, UpdateExpenseRow};
pub use family::FamilyRepository;
pub use user::UserRepository;
