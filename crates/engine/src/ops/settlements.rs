//! Settlement operations.
//!
//! Suggestions are transient: the payment plan is recomputed from current
//! balances on every query and never stored. Recording a settlement persists
//! it as a regular expense record with the settlement split kind, so the next
//! balance read picks it up like any other record.

use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Expense, MoneyCents, ResultEngine, SplitKind, balances, expenses,
    settlement::validate_settlement,
    shares::{Share, ShareSpec},
    simplify::{PlannedPayment, simplify},
};

use super::{Engine, RecordedSettlement, with_tx};

impl Engine {
    /// Suggested payment plan that zeroes every member's balance.
    pub async fn suggest_settlements(&self, group_id: Uuid) -> ResultEngine<Vec<PlannedPayment>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let members = self.group_members(&db_tx, group_id).await?;
            let records = self.group_expenses(&db_tx, group_id).await?;
            let sheet = balances::aggregate(group_id, &members, &records)?;
            simplify(&sheet)
        })
    }

    /// Record a payment from `from` to `to` as a settlement expense.
    ///
    /// The payment is validated against the balances computed inside the same
    /// DB transaction, so a concurrent write cannot slip a stale sheet past
    /// the checks. A validation failure rejects the settlement outright; an
    /// overpayment is accepted and reported back as a hint.
    pub async fn record_settlement(
        &self,
        group_id: Uuid,
        from: Uuid,
        to: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<RecordedSettlement> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.require_member_in_group(&db_tx, group_id, from).await?;
            self.require_member_in_group(&db_tx, group_id, to).await?;

            let members = self.group_members(&db_tx, group_id).await?;
            let records = self.group_expenses(&db_tx, group_id).await?;
            let sheet = balances::aggregate(group_id, &members, &records)?;
            let check = validate_settlement(from, to, amount, &sheet)?;

            let mut expense = Expense::new(
                group_id,
                "Settlement".to_string(),
                amount,
                from,
                SplitKind::Settlement,
                None,
                None,
                Utc::now(),
            )?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            // The single share names the receiver; the payer is `paid_by`.
            let share = Share::new(expense.id, to, ShareSpec::Even);
            let mut model = crate::shares::ActiveModel::from(&share);
            model.position = ActiveValue::Set(0);
            model.insert(&db_tx).await?;
            expense.shares = vec![share];

            tracing::info!(
                group = %group_id,
                %from,
                %to,
                amount = amount.cents(),
                overpaid = check.overpaid.is_some(),
                "settlement recorded"
            );
            Ok(RecordedSettlement {
                expense,
                overpaid: check.overpaid,
            })
        })
    }
}
