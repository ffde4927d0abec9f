//! Expense record operations.
//!
//! Records are append-only events: creating, editing or deleting one never
//! touches a stored balance. Readers recompute balances from the remaining
//! history, which is what makes edits and deletes safe.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, MoneyCents, ResultEngine, SplitKind, expenses,
    shares::{Share, ShareSpec},
    util::normalize_optional_text,
};

use super::{Engine, ExpensePatch, NewExpense, ParticipantInput, with_tx};

/// Checks that the participant set has the shape its split kind requires.
///
/// Percentages must sum to exactly 100.00% and custom amounts to exactly the
/// total; with integer cents there is no tolerance window to hide behind, so
/// malformed splits are rejected here instead of skewing balances later.
fn validate_participants(
    kind: SplitKind,
    amount: MoneyCents,
    participants: &[ParticipantInput],
) -> ResultEngine<()> {
    match kind {
        SplitKind::Equal => {
            for p in participants {
                if p.spec != ShareSpec::Even {
                    return Err(EngineError::InvalidSplitKind(
                        "equal split takes no weights".to_string(),
                    ));
                }
            }
        }
        SplitKind::Percentage => {
            let mut total_bp = 0i64;
            for p in participants {
                let ShareSpec::Percent { percent_bp } = p.spec else {
                    return Err(EngineError::InvalidSplitKind(
                        "percentage split requires a percentage on every participant".to_string(),
                    ));
                };
                // Per-item bounds first, so the sum below cannot overflow.
                if percent_bp <= 0 || percent_bp > 10_000 {
                    return Err(EngineError::InvalidAmount(format!(
                        "percentage for member {} must be between 0% and 100%",
                        p.member_id
                    )));
                }
                total_bp += percent_bp;
            }
            if total_bp != 10_000 {
                return Err(EngineError::InvalidAmount(format!(
                    "percentages must sum to 100%, got {}.{:02}%",
                    total_bp / 100,
                    total_bp % 100
                )));
            }
        }
        SplitKind::Custom => {
            let mut total = MoneyCents::ZERO;
            for p in participants {
                let ShareSpec::Amount { amount: owed } = p.spec else {
                    return Err(EngineError::InvalidSplitKind(
                        "custom split requires an amount on every participant".to_string(),
                    ));
                };
                if owed.is_negative() || owed > amount {
                    return Err(EngineError::InvalidAmount(format!(
                        "custom amount for member {} must be between 0 and the total",
                        p.member_id
                    )));
                }
                total += owed;
            }
            if total != amount {
                return Err(EngineError::InvalidAmount(format!(
                    "custom amounts sum to {total}, expense total is {amount}"
                )));
            }
        }
        SplitKind::Settlement => {
            return Err(EngineError::InvalidSplitKind(
                "settlements are recorded through record_settlement".to_string(),
            ));
        }
    }
    Ok(())
}

impl Engine {
    async fn insert_shares(
        &self,
        db_tx: &DatabaseTransaction,
        expense_id: Uuid,
        participants: &[ParticipantInput],
    ) -> ResultEngine<Vec<Share>> {
        let mut out = Vec::with_capacity(participants.len());
        for (position, p) in participants.iter().enumerate() {
            let share = Share::new(expense_id, p.member_id, p.spec);
            let mut model = crate::shares::ActiveModel::from(&share);
            model.position = ActiveValue::Set(position as i32);
            model.insert(db_tx).await?;
            out.push(share);
        }
        Ok(out)
    }

    /// Create a shared-cost expense in a group.
    ///
    /// The payer and every participant must belong to the group. An empty
    /// participant list on an equal split expands to all group members.
    pub async fn create_expense(
        &self,
        group_id: Uuid,
        new_expense: NewExpense,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.require_member_in_group(&db_tx, group_id, new_expense.paid_by)
                .await?;

            let mut participants = new_expense.participants;
            if participants.is_empty() && new_expense.kind == SplitKind::Equal {
                participants = self
                    .group_members(&db_tx, group_id)
                    .await?
                    .into_iter()
                    .map(|m| ParticipantInput {
                        member_id: m.id,
                        spec: ShareSpec::Even,
                    })
                    .collect();
            }

            let mut expense = Expense::new(
                group_id,
                new_expense.description.trim().to_string(),
                new_expense.amount,
                new_expense.paid_by,
                new_expense.kind,
                normalize_optional_text(new_expense.category.as_deref()),
                normalize_optional_text(new_expense.note.as_deref()),
                new_expense.occurred_at.unwrap_or_else(Utc::now),
            )?;

            if participants.is_empty() {
                return Err(EngineError::EmptyParticipantSet {
                    expense: expense.id,
                });
            }
            for p in &participants {
                self.require_member_in_group(&db_tx, group_id, p.member_id)
                    .await?;
            }
            validate_participants(expense.kind, expense.amount, &participants)?;

            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            expense.shares = self.insert_shares(&db_tx, expense.id, &participants).await?;

            tracing::info!(
                group = %group_id,
                expense = %expense.id,
                amount = expense.amount.cents(),
                kind = expense.kind.as_str(),
                "expense created"
            );
            Ok(expense)
        })
    }

    /// Update an expense in place. Settlement records are immutable.
    pub async fn update_expense(
        &self,
        group_id: Uuid,
        expense_id: Uuid,
        patch: ExpensePatch,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense_in_group(&db_tx, group_id, expense_id).await?;
            let stored = Expense::try_from(model)?;
            if stored.is_settlement() {
                return Err(EngineError::InvalidSplitKind(
                    "settlement records cannot be edited".to_string(),
                ));
            }

            let amount = patch.amount.unwrap_or(stored.amount);
            expenses::validate_amount(amount)?;
            let paid_by = patch.paid_by.unwrap_or(stored.paid_by);
            self.require_member_in_group(&db_tx, group_id, paid_by).await?;

            // Effective participants: the new set if given, otherwise the
            // stored shares. Either way the shape must still match the kind
            // under the (possibly new) amount.
            let participants: Vec<ParticipantInput> = match &patch.participants {
                Some(given) => given.clone(),
                None => self
                    .expense_shares(&db_tx, expense_id)
                    .await?
                    .into_iter()
                    .map(|s| ParticipantInput {
                        member_id: s.member_id,
                        spec: s.spec,
                    })
                    .collect(),
            };
            if participants.is_empty() {
                return Err(EngineError::EmptyParticipantSet {
                    expense: expense_id,
                });
            }
            for p in &participants {
                self.require_member_in_group(&db_tx, group_id, p.member_id)
                    .await?;
            }
            validate_participants(stored.kind, amount, &participants)?;

            let active = expenses::ActiveModel {
                id: ActiveValue::Set(expense_id),
                description: match patch.description {
                    Some(d) => ActiveValue::Set(d.trim().to_string()),
                    None => ActiveValue::NotSet,
                },
                amount_cents: ActiveValue::Set(amount.cents()),
                paid_by: ActiveValue::Set(paid_by),
                category: match patch.category {
                    Some(c) => ActiveValue::Set(normalize_optional_text(Some(&c))),
                    None => ActiveValue::NotSet,
                },
                note: match patch.note {
                    Some(n) => ActiveValue::Set(normalize_optional_text(Some(&n))),
                    None => ActiveValue::NotSet,
                },
                occurred_at: match patch.occurred_at {
                    Some(at) => ActiveValue::Set(at),
                    None => ActiveValue::NotSet,
                },
                ..Default::default()
            };
            active.update(&db_tx).await?;

            if patch.participants.is_some() {
                crate::shares::Entity::delete_many()
                    .filter(crate::shares::Column::ExpenseId.eq(expense_id))
                    .exec(&db_tx)
                    .await?;
                self.insert_shares(&db_tx, expense_id, &participants).await?;
            }

            let updated = self
                .require_expense_in_group(&db_tx, group_id, expense_id)
                .await?;
            let mut expense = Expense::try_from(updated)?;
            expense.shares = self.expense_shares(&db_tx, expense_id).await?;
            Ok(expense)
        })
    }

    /// Delete an expense and its shares.
    ///
    /// Balances are not adjusted here: the next read recomputes from the
    /// remaining records, which is the only drift-free way to handle deletes.
    pub async fn delete_expense(&self, group_id: Uuid, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_expense_in_group(&db_tx, group_id, expense_id).await?;

            crate::shares::Entity::delete_many()
                .filter(crate::shares::Column::ExpenseId.eq(expense_id))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id).exec(&db_tx).await?;

            tracing::info!(group = %group_id, expense = %expense_id, "expense deleted");
            Ok(())
        })
    }

    /// Full expense history of a group, oldest first.
    pub async fn expenses(&self, group_id: Uuid) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.group_expenses(&db_tx, group_id).await
        })
    }

    async fn expense_shares(
        &self,
        db_tx: &DatabaseTransaction,
        expense_id: Uuid,
    ) -> ResultEngine<Vec<Share>> {
        let mut models = crate::shares::Entity::find()
            .filter(crate::shares::Column::ExpenseId.eq(expense_id))
            .all(db_tx)
            .await?;
        models.sort_by_key(|s| s.position);
        Ok(models.into_iter().map(Into::into).collect())
    }
}
