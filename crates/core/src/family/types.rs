//! Family relationship data types.

use std::collections::BTreeSet;

use uuid::Uuid;

/// One identity's view of the relationship graph.
///
/// `members` is conceptually symmetric: if A appears in B's members, B must
/// appear in A's. `pending_requests` is asymmetric; it records identities the
/// owner may approve into their own family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipState {
    /// The identity this state belongs to.
    pub owner: Uuid,
    /// Approved family member IDs.
    pub members: BTreeSet<Uuid>,
    /// Incoming, unapproved request IDs.
    pub pending_requests: BTreeSet<Uuid>,
}

impl RelationshipState {
    /// Creates an empty state for a freshly registered identity.
    #[must_use]
    pub const fn new(owner: Uuid) -> Self {
        Self {
            owner,
            members: BTreeSet::new(),
            pending_requests: BTreeSet::new(),
        }
    }

    /// Whether `other` is an approved family member.
    #[must_use]
    pub fn is_member(&self, other: Uuid) -> bool {
        self.members.contains(&other)
    }

    /// Whether a request from `other` is pending approval.
    #[must_use]
    pub fn has_pending(&self, other: Uuid) -> bool {
        self.pending_requests.contains(&other)
    }
}

/// Outcome of resolving a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The request was approved; a symmetric link must be established.
    Approved,
    /// The request was rejected; the pending entry is removed.
    Rejected,
    /// The request no longer exists (resolved elsewhere). No-op, not a fault.
    AlreadyResolved,
}

/// Plan produced by resolving a request.
///
/// The caller must apply `establish_link` and `clear_request` in a single
/// transaction: the symmetric edge lives in two records, and a partial write
/// leaves the graph asymmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// What happened.
    pub outcome: ResolveOutcome,
    /// Whether a symmetric link must be written for both identities.
    pub establish_link: bool,
    /// Whether the pending request entry must be removed.
    pub clear_request: bool,
}

/// Repair plan for an asymmetric member set, produced by
/// [`reconcile_members`](crate::family::reconcile_members).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// The reconciled member set (union of both directions).
    pub members: BTreeSet<Uuid>,
    /// Members missing the owner-side record.
    pub missing_outgoing: Vec<Uuid>,
    /// Members missing the reciprocal record.
    pub missing_incoming: Vec<Uuid>,
}

impl ReconcilePlan {
    /// Whether both directions already agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.missing_outgoing.is_empty() && self.missing_incoming.is_empty()
    }
}
