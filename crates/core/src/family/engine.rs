//! Relationship-graph decision logic.
//!
//! All functions here are pure: they look at a loaded [`RelationshipState`]
//! and decide what must be persisted. Concurrent resolution of the same
//! request is deterministic because the operation that observes the request
//! absent gets [`ResolveOutcome::AlreadyResolved`], never an error.

use std::collections::BTreeSet;

use uuid::Uuid;

use super::error::FamilyError;
use super::types::{ReconcilePlan, RelationshipState, Resolution, ResolveOutcome};

/// Checks whether `requester` may record a link request on `target`.
///
/// # Errors
///
/// Returns `FamilyError::SelfLink` if the requester targets themself,
/// `FamilyError::AlreadyLinked` if they are already family members, or
/// `FamilyError::RequestPending` if an identical request is already pending.
pub fn plan_link_request(target: &RelationshipState, requester: Uuid) -> Result<(), FamilyError> {
    if requester == target.owner {
        return Err(FamilyError::SelfLink);
    }
    if target.is_member(requester) {
        return Err(FamilyError::AlreadyLinked);
    }
    if target.has_pending(requester) {
        return Err(FamilyError::RequestPending);
    }
    Ok(())
}

/// Resolves a pending request on `owner` from `requester`.
///
/// Approving establishes the symmetric link and clears the request; rejecting
/// clears the request without touching members. If the request is absent
/// (already approved or rejected elsewhere) the resolution is a no-op.
#[must_use]
pub fn resolve_request(owner: &RelationshipState, requester: Uuid, approve: bool) -> Resolution {
    if !owner.has_pending(requester) {
        return Resolution {
            outcome: ResolveOutcome::AlreadyResolved,
            establish_link: false,
            clear_request: false,
        };
    }

    if approve {
        Resolution {
            outcome: ResolveOutcome::Approved,
            // Idempotent: a stray request from an existing member only
            // clears the request, it never duplicates the edge.
            establish_link: !owner.is_member(requester),
            clear_request: true,
        }
    } else {
        Resolution {
            outcome: ResolveOutcome::Rejected,
            establish_link: false,
            clear_request: true,
        }
    }
}

/// Reconciles the two directions of an identity's member records.
///
/// The symmetric edge is stored as one record per direction; a partial write
/// leaves the directions disagreeing. The reconciled set is the union of both
/// directions, and the plan lists the records that must be backfilled to
/// restore symmetry.
#[must_use]
pub fn reconcile_members(
    outgoing: &BTreeSet<Uuid>,
    incoming: &BTreeSet<Uuid>,
) -> ReconcilePlan {
    let members: BTreeSet<Uuid> = outgoing.union(incoming).copied().collect();
    let missing_outgoing = incoming.difference(outgoing).copied().collect();
    let missing_incoming = outgoing.difference(incoming).copied().collect();

    ReconcilePlan {
        members,
        missing_outgoing,
        missing_incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn uuids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn state(owner: Uuid, members: &[Uuid], pending: &[Uuid]) -> RelationshipState {
        RelationshipState {
            owner,
            members: members.iter().copied().collect(),
            pending_requests: pending.iter().copied().collect(),
        }
    }

    #[test]
    fn test_fresh_request_is_allowed() {
        let ids = uuids(2);
        let target = RelationshipState::new(ids[0]);
        assert!(plan_link_request(&target, ids[1]).is_ok());
    }

    #[test]
    fn test_self_request_rejected() {
        let ids = uuids(1);
        let target = RelationshipState::new(ids[0]);
        assert_eq!(
            plan_link_request(&target, ids[0]),
            Err(FamilyError::SelfLink)
        );
    }

    #[test]
    fn test_request_to_existing_member_rejected() {
        let ids = uuids(2);
        let target = state(ids[0], &[ids[1]], &[]);
        assert_eq!(
            plan_link_request(&target, ids[1]),
            Err(FamilyError::AlreadyLinked)
        );
    }

    #[test]
    fn test_duplicate_request_rejected() {
        let ids = uuids(2);
        let target = state(ids[0], &[], &[ids[1]]);
        assert_eq!(
            plan_link_request(&target, ids[1]),
            Err(FamilyError::RequestPending)
        );
    }

    #[test]
    fn test_approve_pending_request() {
        let ids = uuids(2);
        let owner = state(ids[0], &[], &[ids[1]]);
        let resolution = resolve_request(&owner, ids[1], true);

        assert_eq!(resolution.outcome, ResolveOutcome::Approved);
        assert!(resolution.establish_link);
        assert!(resolution.clear_request);
    }

    #[test]
    fn test_reject_pending_request_leaves_members_untouched() {
        let ids = uuids(2);
        let owner = state(ids[0], &[], &[ids[1]]);
        let resolution = resolve_request(&owner, ids[1], false);

        assert_eq!(resolution.outcome, ResolveOutcome::Rejected);
        assert!(!resolution.establish_link);
        assert!(resolution.clear_request);
    }

    // Concurrent approve/reject: whichever observes the request absent is a
    // no-op, regardless of branch.
    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_resolving_absent_request_is_noop(#[case] approve: bool) {
        let ids = uuids(2);
        let owner = RelationshipState::new(ids[0]);
        let resolution = resolve_request(&owner, ids[1], approve);

        assert_eq!(resolution.outcome, ResolveOutcome::AlreadyResolved);
        assert!(!resolution.establish_link);
        assert!(!resolution.clear_request);
    }

    #[test]
    fn test_approving_stray_request_from_member_only_clears_it() {
        let ids = uuids(2);
        let owner = state(ids[0], &[ids[1]], &[ids[1]]);
        let resolution = resolve_request(&owner, ids[1], true);

        assert_eq!(resolution.outcome, ResolveOutcome::Approved);
        assert!(!resolution.establish_link);
        assert!(resolution.clear_request);
    }

    #[test]
    fn test_reconcile_consistent_sets() {
        let ids = uuids(2);
        let set: BTreeSet<Uuid> = ids.iter().copied().collect();
        let plan = reconcile_members(&set, &set);

        assert!(plan.is_consistent());
        assert_eq!(plan.members, set);
    }

    #[test]
    fn test_reconcile_repairs_missing_reciprocal() {
        let ids = uuids(3);
        let outgoing: BTreeSet<Uuid> = [ids[0], ids[1]].into_iter().collect();
        let incoming: BTreeSet<Uuid> = [ids[0], ids[2]].into_iter().collect();

        let plan = reconcile_members(&outgoing, &incoming);

        assert!(!plan.is_consistent());
        assert_eq!(plan.members.len(), 3);
        assert_eq!(plan.missing_outgoing, vec![ids[2]]);
        assert_eq!(plan.missing_incoming, vec![ids[1]]);
    }
}
