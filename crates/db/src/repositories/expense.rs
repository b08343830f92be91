//! Expense repository for database operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{currencies, expenses};

/// Input for inserting an expense row (already validated by the core).
#[derive(Debug, Clone)]
pub struct NewExpenseRow {
    /// Owning identity; always the authenticated caller.
    pub owner_id: Uuid,
    /// Amount spent.
    pub amount: Decimal,
    /// Date of the expense.
    pub date: NaiveDate,
    /// Spending category.
    pub category: String,
    /// Currency code.
    pub currency_code: String,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Owner-scoped update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseRow {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New date.
    pub date: Option<NaiveDate>,
    /// New category.
    pub category: Option<String>,
    /// New currency code.
    pub currency_code: Option<String>,
    /// New comment (`Some(None)` clears it).
    pub comment: Option<Option<String>>,
}

/// Expense repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts a new expense attributed to `input.owner_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: NewExpenseRow) -> Result<expenses::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(input.owner_id),
            amount: Set(input.amount),
            date: Set(input.date),
            category: Set(input.category),
            currency_code: Set(input.currency_code),
            comment: Set(input.comment),
            created_at: Set(now),
            updated_at: Set(now),
        };

        expense.insert(&self.db).await
    }

    /// Fetches all expenses whose owner is in the visibility set.
    ///
    /// Ordered by date descending, tie-broken by last-modified descending;
    /// a one-shot snapshot read.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_owners(&self, owner_ids: &[Uuid]) -> Result<Vec<expenses::Model>, DbErr> {
        expenses::Entity::find()
            .filter(expenses::Column::OwnerId.is_in(owner_ids.iter().copied()))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::UpdatedAt)
            .all(&self.db)
            .await
    }

    /// Finds an expense owned by `owner_id`.
    ///
    /// Scoping by owner here is what makes expense mutation owner-only: a
    /// foreign expense simply does not exist from the caller's perspective.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_own(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<expenses::Model>, DbErr> {
        expenses::Entity::find_by_id(id)
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
    }

    /// Updates an expense owned by `owner_id`; returns `None` if the caller
    /// does not own it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_own(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: UpdateExpenseRow,
    ) -> Result<Option<expenses::Model>, DbErr> {
        let Some(existing) = self.find_own(id, owner_id).await? else {
            return Ok(None);
        };

        let mut model: expenses::ActiveModel = existing.into();
        if let Some(amount) = changes.amount {
            model.amount = Set(amount);
        }
        if let Some(date) = changes.date {
            model.date = Set(date);
        }
        if let Some(category) = changes.category {
            model.category = Set(category);
        }
        if let Some(currency_code) = changes.currency_code {
            model.currency_code = Set(currency_code);
        }
        if let Some(comment) = changes.comment {
            model.comment = Set(comment);
        }
        model.updated_at = Set(chrono::Utc::now().into());

        model.update(&self.db).await.map(Some)
    }

    /// Deletes an expense owned by `owner_id`; returns whether a row went away.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete_own(&self, id: Uuid, owner_id: Uuid) -> Result<bool, DbErr> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(id))
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Lists all currencies (reference data for the expense form).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_currencies(&self) -> Result<Vec<currencies::Model>, DbErr> {
        currencies::Entity::find().all(&self.db).await
    }
}
