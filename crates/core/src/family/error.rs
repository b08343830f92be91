//! Family relationship error types.

use thiserror::Error;

/// Errors from relationship-graph decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FamilyError {
    /// An identity cannot link to itself.
    #[error("cannot request a family link with yourself")]
    SelfLink,

    /// The identities are already family members.
    #[error("already a family member")]
    AlreadyLinked,

    /// A request between these identities is already pending.
    #[error("a family request is already pending")]
    RequestPending,
}
