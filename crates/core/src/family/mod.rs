//! Family relationship engine.
//!
//! Family links are symmetric edges between two identities; a pending request
//! is a one-directional proposal stored on the target identity. The engine is
//! pure decision logic: callers load an identity's [`RelationshipState`],
//! ask for a plan, and persist the plan atomically.

mod engine;
mod error;
mod types;

pub use engine::{plan_link_request, reconcile_members, resolve_request};
pub use error::FamilyError;
pub use types::{ReconcilePlan, RelationshipState, Resolution, ResolveOutcome};
