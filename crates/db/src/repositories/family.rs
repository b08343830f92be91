//! Family relationship repository.
//!
//! Persists the relationship graph decided by `hearth_core::family`. The
//! symmetric edge lives in two directed rows; every mutation that touches
//! both rows runs in a single transaction, and reads reconcile the two
//! directions so a historical partial write heals instead of lingering.

use std::collections::BTreeSet;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait, sea_query::OnConflict,
};
use tracing::warn;
use uuid::Uuid;

use hearth_core::family::{ReconcilePlan, RelationshipState, reconcile_members};

use crate::entities::{family_links, family_requests};

/// Repository for family links and pending requests.
#[derive(Debug, Clone)]
pub struct FamilyRepository {
    db: DatabaseConnection,
}

impl FamilyRepository {
    /// Creates a new family repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads an identity's full relationship state (members + pending).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn relationship_state(&self, user_id: Uuid) -> Result<RelationshipState, DbErr> {
        let members = self.members_of(user_id).await?;

        let pending: Vec<Uuid> = family_requests::Entity::find()
            .select_only()
            .column(family_requests::Column::RequesterId)
            .filter(family_requests::Column::TargetId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(RelationshipState {
            owner: user_id,
            members,
            pending_requests: pending.into_iter().collect(),
        })
    }

    /// Returns the approved family member IDs for `user_id`.
    ///
    /// Reads both directions of the edge and reconciles them: if a partial
    /// write ever left the graph asymmetric, the missing rows are backfilled
    /// here before the set is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query or the repair write fails.
    pub async fn members_of(&self, user_id: Uuid) -> Result<BTreeSet<Uuid>, DbErr> {
        let outgoing: Vec<Uuid> = family_links::Entity::find()
            .select_only()
            .column(family_links::Column::MemberId)
            .filter(family_links::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        let incoming: Vec<Uuid> = family_links::Entity::find()
            .select_only()
            .column(family_links::Column::UserId)
            .filter(family_links::Column::MemberId.eq(user_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        let outgoing: BTreeSet<Uuid> = outgoing.into_iter().collect();
        let incoming: BTreeSet<Uuid> = incoming.into_iter().collect();
        let plan = reconcile_members(&outgoing, &incoming);

        if !plan.is_consistent() {
            warn!(
                user_id = %user_id,
                missing_outgoing = plan.missing_outgoing.len(),
                missing_incoming = plan.missing_incoming.len(),
                "asymmetric family links detected; repairing"
            );
            self.repair(user_id, &plan).await?;
        }

        Ok(plan.members)
    }

    async fn repair(&self, user_id: Uuid, plan: &ReconcilePlan) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;

        for &other in &plan.missing_outgoing {
            insert_link(&txn, user_id, other).await?;
        }
        for &other in &plan.missing_incoming {
            insert_link(&txn, other, user_id).await?;
        }

        txn.commit().await
    }

    /// Records a pending request from `requester_id` on `target_id`.
    ///
    /// The caller has already validated the request against the target's
    /// relationship state (`hearth_core::family::plan_link_request`).
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn add_request(&self, target_id: Uuid, requester_id: Uuid) -> Result<(), DbErr> {
        let request = family_requests::ActiveModel {
            target_id: Set(target_id),
            requester_id: Set(requester_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        // Idempotent under a concurrent duplicate request.
        family_requests::Entity::insert(request)
            .on_conflict(
                OnConflict::columns([
                    family_requests::Column::TargetId,
                    family_requests::Column::RequesterId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    /// Approves a pending request: establishes the symmetric link and clears
    /// the request in ONE transaction.
    ///
    /// Both directed rows and the request deletion commit together, so a
    /// failure anywhere leaves the graph untouched rather than asymmetric.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails; the caller may retry.
    pub async fn approve(
        &self,
        owner_id: Uuid,
        requester_id: Uuid,
        establish_link: bool,
    ) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;

        if establish_link {
            insert_link(&txn, owner_id, requester_id).await?;
            insert_link(&txn, requester_id, owner_id).await?;
        }

        delete_request(&txn, owner_id, requester_id).await?;

        txn.commit().await
    }

    /// Rejects a pending request, removing it without touching members.
    ///
    /// Deleting an absent request is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn reject(&self, owner_id: Uuid, requester_id: Uuid) -> Result<(), DbErr> {
        delete_request(&self.db, owner_id, requester_id).await
    }

    /// Removes the family link between two identities symmetrically.
    ///
    /// Both directed rows are deleted in one transaction; unlinking
    /// identities that are not linked is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn unlink(&self, a: Uuid, b: Uuid) -> Result<(), DbErr> {
        let txn = self.db.begin().await?;

        family_links::Entity::delete_many()
            .filter(family_links::Column::UserId.eq(a))
            .filter(family_links::Column::MemberId.eq(b))
            .exec(&txn)
            .await?;

        family_links::Entity::delete_many()
            .filter(family_links::Column::UserId.eq(b))
            .filter(family_links::Column::MemberId.eq(a))
            .exec(&txn)
            .await?;

        txn.commit().await
    }
}

async fn insert_link<C: ConnectionTrait>(conn: &C, user_id: Uuid, member_id: Uuid) -> Result<(), DbErr> {
    let link = family_links::ActiveModel {
        user_id: Set(user_id),
        member_id: Set(member_id),
        created_at: Set(chrono::Utc::now().into()),
    };

    family_links::Entity::insert(link)
        .on_conflict(
            OnConflict::columns([
                family_links::Column::UserId,
                family_links::Column::MemberId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

async fn delete_request<C: ConnectionTrait>(
    conn: &C,
    target_id: Uuid,
    requester_id: Uuid,
) -> Result<(), DbErr> {
    family_requests::Entity::delete_many()
        .filter(family_requests::Column::TargetId.eq(target_id))
        .filter(family_requests::Column::RequesterId.eq(requester_id))
        .exec(conn)
        .await?;

    Ok(())
}
