//! Visibility resolution and expense validation.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ExpenseError;
use super::types::{AnnotatedExpense, ExpenseRecord, NewExpenseInput, OwnerProfile};

/// Computes the set of identities whose expenses `viewer` may read.
///
/// Always `{viewer} ∪ members`; the viewer sees their own expenses even with
/// an empty family.
#[must_use]
pub fn visible_owners(viewer: Uuid, members: &BTreeSet<Uuid>) -> BTreeSet<Uuid> {
    let mut owners = members.clone();
    owners.insert(viewer);
    owners
}

/// Returns the attribution label for an expense owner.
///
/// `"Me"` for the viewer's own records; otherwise the owner's display name,
/// falling back to their email address.
#[must_use]
pub fn owner_label(viewer: Uuid, owner: &OwnerProfile) -> String {
    if owner.id == viewer {
        return "Me".to_string();
    }
    match owner.display_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => owner.email.clone(),
    }
}

/// Annotates expenses with owner labels and orders them for display.
///
/// Sorted by date descending, tie-broken by last-modified descending. This is
/// a one-shot snapshot read: the caller fetched the records once and the
/// result is a finite sequence. Expenses whose owner is missing from
/// `owners` are dropped rather than mislabeled; the repository query already
/// restricts owners to the visibility set, so a miss indicates a stale read.
#[must_use]
pub fn annotate_and_sort(
    viewer: Uuid,
    expenses: Vec<ExpenseRecord>,
    owners: &[OwnerProfile],
) -> Vec<AnnotatedExpense> {
    let profiles: HashMap<Uuid, &OwnerProfile> = owners.iter().map(|o| (o.id, o)).collect();

    let mut annotated: Vec<AnnotatedExpense> = expenses
        .into_iter()
        .filter_map(|expense| {
            profiles.get(&expense.owner_id).map(|owner| AnnotatedExpense {
                owner_label: owner_label(viewer, owner),
                expense,
            })
        })
        .collect();

    annotated.sort_by(|a, b| {
        b.expense
            .date
            .cmp(&a.expense.date)
            .then(b.expense.updated_at.cmp(&a.expense.updated_at))
    });

    annotated
}

/// Validates input for a new expense.
///
/// # Errors
///
/// Returns `ExpenseError::MissingField` if amount, date, category, or
/// currency is absent or blank, and `ExpenseError::NonPositiveAmount` for a
/// zero or negative amount.
pub fn validate_new_expense(input: &NewExpenseInput) -> Result<(), ExpenseError> {
    let amount = input.amount.ok_or(ExpenseError::MissingField("amount"))?;
    if amount <= Decimal::ZERO {
        return Err(ExpenseError::NonPositiveAmount);
    }

    if input.date.is_none() {
        return Err(ExpenseError::MissingField("date"));
    }

    match input.category.as_deref() {
        Some(c) if !c.trim().is_empty() => {}
        _ => return Err(ExpenseError::MissingField("category")),
    }

    match input.currency.as_deref() {
        Some(c) if !c.trim().is_empty() => {}
        _ => return Err(ExpenseError::MissingField("currency")),
    }

    Ok(())
}

/// Validates fields supplied in an expense update.
///
/// Absent fields are left unchanged and pass; a provided field obeys the
/// same rules as at creation time, so an update can never blank out a
/// required value.
///
/// # Errors
///
/// Returns `ExpenseError::NonPositiveAmount` for a zero or negative amount,
/// and `ExpenseError::MissingField` for a blank category or currency.
pub fn validate_expense_update(
    amount: Option<Decimal>,
    category: Option<&str>,
    currency: Option<&str>,
) -> Result<(), ExpenseError> {
    if let Some(amount) = amount {
        if amount <= Decimal::ZERO {
            return Err(ExpenseError::NonPositiveAmount);
        }
    }

    if let Some(c) = category {
        if c.trim().is_empty() {
            return Err(ExpenseError::MissingField("category"));
        }
    }

    if let Some(c) = currency {
        if c.trim().is_empty() {
            return Err(ExpenseError::MissingField("currency"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn profile(id: Uuid, name: Option<&str>, email: &str) -> OwnerProfile {
        OwnerProfile {
            id,
            display_name: name.map(ToString::to_string),
            email: email.to_string(),
        }
    }

    fn expense(owner: Uuid, date: NaiveDate, updated_secs: i64) -> ExpenseRecord {
        ExpenseRecord {
            id: Uuid::new_v4(),
            owner_id: owner,
            amount: dec!(10),
            date,
            category: "food".to_string(),
            currency: "EUR".to_string(),
            comment: None,
            created_at: Utc.timestamp_opt(updated_secs, 0).unwrap(),
            updated_at: Utc.timestamp_opt(updated_secs, 0).unwrap(),
        }
    }

    fn valid_input() -> NewExpenseInput {
        NewExpenseInput {
            amount: Some(dec!(10)),
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            category: Some("food".to_string()),
            currency: Some("EUR".to_string()),
            comment: None,
        }
    }

    #[test]
    fn test_visible_owners_always_includes_self() {
        let viewer = Uuid::new_v4();
        assert!(visible_owners(viewer, &BTreeSet::new()).contains(&viewer));
    }

    #[test]
    fn test_visible_owners_is_self_union_members() {
        let viewer = Uuid::new_v4();
        let member = Uuid::new_v4();
        let members: BTreeSet<Uuid> = [member].into_iter().collect();

        let owners = visible_owners(viewer, &members);
        assert_eq!(owners.len(), 2);
        assert!(owners.contains(&viewer));
        assert!(owners.contains(&member));
    }

    #[test]
    fn test_own_expense_labeled_me() {
        let viewer = Uuid::new_v4();
        let owner = profile(viewer, Some("Alice"), "alice@example.com");
        assert_eq!(owner_label(viewer, &owner), "Me");
    }

    #[test]
    fn test_family_expense_labeled_with_display_name() {
        let viewer = Uuid::new_v4();
        let owner = profile(Uuid::new_v4(), Some("Alice"), "alice@example.com");
        assert_eq!(owner_label(viewer, &owner), "Alice");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("   "))]
    fn test_label_falls_back_to_email(#[case] name: Option<&str>) {
        let viewer = Uuid::new_v4();
        let owner = profile(Uuid::new_v4(), name, "alice@example.com");
        assert_eq!(owner_label(viewer, &owner), "alice@example.com");
    }

    #[test]
    fn test_ordering_date_desc_then_updated_desc() {
        let viewer = Uuid::new_v4();
        let owners = [profile(viewer, Some("Alice"), "alice@example.com")];

        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jan2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let older = expense(viewer, jan1, 100);
        let newer_same_day = expense(viewer, jan2, 300);
        let earlier_same_day = expense(viewer, jan2, 200);

        let annotated = annotate_and_sort(
            viewer,
            vec![older.clone(), earlier_same_day.clone(), newer_same_day.clone()],
            &owners,
        );

        let ids: Vec<Uuid> = annotated.iter().map(|a| a.expense.id).collect();
        assert_eq!(ids, vec![newer_same_day.id, earlier_same_day.id, older.id]);
    }

    #[test]
    fn test_expense_outside_owner_set_is_dropped() {
        let viewer = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let owners = [profile(viewer, Some("Alice"), "alice@example.com")];

        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let annotated =
            annotate_and_sort(viewer, vec![expense(stranger, jan1, 100)], &owners);

        assert!(annotated.is_empty());
    }

    #[rstest]
    #[case::amount(NewExpenseInput { amount: None, ..valid_input() }, "amount")]
    #[case::date(NewExpenseInput { date: None, ..valid_input() }, "date")]
    #[case::category(NewExpenseInput { category: None, ..valid_input() }, "category")]
    #[case::blank_category(NewExpenseInput { category: Some("  ".into()), ..valid_input() }, "category")]
    #[case::currency(NewExpenseInput { currency: None, ..valid_input() }, "currency")]
    fn test_missing_fields_rejected(#[case] input: NewExpenseInput, #[case] field: &'static str) {
        assert_eq!(
            validate_new_expense(&input),
            Err(ExpenseError::MissingField(field))
        );
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let input = NewExpenseInput {
            amount: Some(dec!(0)),
            ..valid_input()
        };
        assert_eq!(
            validate_new_expense(&input),
            Err(ExpenseError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_valid_input_accepted() {
        assert!(validate_new_expense(&valid_input()).is_ok());
    }

    #[test]
    fn test_update_with_no_fields_accepted() {
        assert!(validate_expense_update(None, None, None).is_ok());
    }

    #[test]
    fn test_update_non_positive_amount_rejected() {
        assert_eq!(
            validate_expense_update(Some(dec!(-1)), None, None),
            Err(ExpenseError::NonPositiveAmount)
        );
    }

    #[rstest]
    #[case::blank_category(Some(""), None, "category")]
    #[case::whitespace_category(Some("   "), None, "category")]
    #[case::blank_currency(None, Some(""), "currency")]
    fn test_update_blank_fields_rejected(
        #[case] category: Option<&str>,
        #[case] currency: Option<&str>,
        #[case] field: &'static str,
    ) {
        assert_eq!(
            validate_expense_update(None, category, currency),
            Err(ExpenseError::MissingField(field))
        );
    }

    #[test]
    fn test_update_with_valid_fields_accepted() {
        assert!(validate_expense_update(Some(dec!(5)), Some("food"), Some("EUR")).is_ok());
    }
}
