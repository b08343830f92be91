//! `SeaORM` entity definitions.

pub mod currencies;
pub mod expenses;
pub mod family_links;
pub mod family_requests;
pub mod users;
