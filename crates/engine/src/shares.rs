//! Expense shares.
//!
//! A [`Share`] names one participant of an [`Expense`](crate::Expense) and,
//! depending on the split kind, the weight attached to them:
//! - equal / settlement shares carry no weight
//! - percentage shares carry basis points (`2500` = 25%)
//! - custom shares carry an explicit amount in cents
//!
//! Shares describe *who participates and how*; the owed amounts are derived
//! by the split calculator, never stored.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::MoneyCents;

/// Weight attached to a participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "weight", rename_all = "snake_case")]
pub enum ShareSpec {
    /// No explicit weight (equal and settlement splits).
    Even,
    /// Percentage of the total, in basis points.
    Percent { percent_bp: i64 },
    /// Explicit amount owed.
    Amount { amount: MoneyCents },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub member_id: Uuid,
    pub spec: ShareSpec,
}

impl Share {
    pub fn new(expense_id: Uuid, member_id: Uuid, spec: ShareSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            member_id,
            spec,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub expense_id: Uuid,
    pub member_id: Uuid,
    /// Recorded order within the expense. The order is load-bearing: it is
    /// the tie-break for remainder cents and names the settlement receiver.
    pub position: i32,
    pub percent_bp: Option<i64>,
    pub amount_cents: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Share> for ActiveModel {
    fn from(share: &Share) -> Self {
        let (percent_bp, amount_cents) = match share.spec {
            ShareSpec::Even => (None, None),
            ShareSpec::Percent { percent_bp } => (Some(percent_bp), None),
            ShareSpec::Amount { amount } => (None, Some(amount.cents())),
        };
        Self {
            id: ActiveValue::Set(share.id),
            expense_id: ActiveValue::Set(share.expense_id),
            member_id: ActiveValue::Set(share.member_id),
            // Position is assigned by the insert path, which knows the
            // participant order.
            position: ActiveValue::NotSet,
            percent_bp: ActiveValue::Set(percent_bp),
            amount_cents: ActiveValue::Set(amount_cents),
        }
    }
}

impl From<Model> for Share {
    fn from(model: Model) -> Self {
        let spec = match (model.percent_bp, model.amount_cents) {
            (Some(percent_bp), _) => ShareSpec::Percent { percent_bp },
            (None, Some(cents)) => ShareSpec::Amount {
                amount: MoneyCents::new(cents),
            },
            (None, None) => ShareSpec::Even,
        };
        Self {
            id: model.id,
            expense_id: model.expense_id,
            member_id: model.member_id,
            spec,
        }
    }
}
