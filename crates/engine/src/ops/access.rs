//! Lookup and membership helpers shared by the operations.

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Expense, Member, ResultEngine, expenses, groups, members, shares};

use super::Engine;

impl Engine {
    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
    }

    /// Members of a group in join order. The order is the tie-break for the
    /// simplifier, so it must be deterministic.
    pub(super) async fn group_members(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Member>> {
        let models = members::Entity::find()
            .filter(members::Column::GroupId.eq(group_id))
            .order_by_asc(members::Column::JoinedAt)
            .order_by_asc(members::Column::Id)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Member::from).collect())
    }

    pub(super) async fn require_member_in_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        member_id: Uuid,
    ) -> ResultEngine<()> {
        let found = members::Entity::find_by_id(member_id)
            .filter(members::Column::GroupId.eq(group_id))
            .one(db)
            .await?
            .is_some();
        if !found {
            return Err(EngineError::KeyNotFound(format!(
                "member {member_id} not in group"
            )));
        }
        Ok(())
    }

    pub(super) async fn require_expense_in_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(expense_id)
            .filter(expenses::Column::GroupId.eq(group_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))
    }

    /// Full expense history of a group with shares attached, oldest first.
    pub(super) async fn group_expenses(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<Expense>> {
        let rows: Vec<(expenses::Model, Vec<shares::Model>)> = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id))
            .order_by_asc(expenses::Column::OccurredAt)
            .order_by_asc(expenses::Column::CreatedAt)
            .find_with_related(shares::Entity)
            .all(db)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (expense_model, mut share_models) in rows {
            // `find_with_related` gives no ordering guarantee for the related
            // rows; restore the recorded participant order.
            share_models.sort_by_key(|s| s.position);
            let mut expense = Expense::try_from(expense_model)?;
            expense.shares = share_models.into_iter().map(Into::into).collect();
            out.push(expense);
        }
        Ok(out)
    }
}
