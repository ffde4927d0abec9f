//! Expense records.
//!
//! An [`Expense`] is an append-only event: either a shared cost paid by one
//! member on behalf of a participant set, or a direct settlement payment
//! between exactly two members. Balances are never stored on the record; they
//! are recomputed from the full record history.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, shares};

/// How an expense's amount is divided across its participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    /// Every participant owes an even share.
    Equal,
    /// Each participant owes a percentage of the amount.
    Percentage,
    /// Each participant owes an explicit amount.
    Custom,
    /// A direct payment from the payer (debtor) to a single receiver.
    Settlement,
}

impl SplitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Custom => "custom",
            Self::Settlement => "settlement",
        }
    }
}

impl TryFrom<&str> for SplitKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "percentage" => Ok(Self::Percentage),
            "custom" => Ok(Self::Custom),
            "settlement" => Ok(Self::Settlement),
            other => Err(EngineError::InvalidSplitKind(other.to_string())),
        }
    }
}

/// Checks that an expense or settlement amount is positive and within
/// [`MoneyCents::MAX_AMOUNT`].
pub(crate) fn validate_amount(amount: MoneyCents) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
    }
    if amount > MoneyCents::MAX_AMOUNT {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be <= {}",
            MoneyCents::MAX_AMOUNT
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub paid_by: Uuid,
    pub kind: SplitKind,
    pub category: Option<String>,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Participant set, in recorded order. The order matters: it is the
    /// tie-break for remainder distribution and settlement suggestions.
    pub shares: Vec<shares::Share>,
}

impl Expense {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group_id: Uuid,
        description: String,
        amount: MoneyCents,
        paid_by: Uuid,
        kind: SplitKind,
        category: Option<String>,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        validate_amount(amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            description,
            amount,
            paid_by,
            kind,
            category,
            note,
            occurred_at,
            created_at: Utc::now(),
            shares: Vec::new(),
        })
    }

    /// A settlement is a direct payment between two members; it adjusts
    /// balances but does not count towards the group's total spent.
    #[must_use]
    pub fn is_settlement(&self) -> bool {
        self.kind == SplitKind::Settlement
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub amount_cents: i64,
    pub paid_by: Uuid,
    pub split_kind: String,
    pub category: Option<String>,
    pub note: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(has_many = "super::shares::Entity")]
    Shares,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id),
            group_id: ActiveValue::Set(expense.group_id),
            description: ActiveValue::Set(expense.description.clone()),
            amount_cents: ActiveValue::Set(expense.amount.cents()),
            paid_by: ActiveValue::Set(expense.paid_by),
            split_kind: ActiveValue::Set(expense.kind.as_str().to_string()),
            category: ActiveValue::Set(expense.category.clone()),
            note: ActiveValue::Set(expense.note.clone()),
            occurred_at: ActiveValue::Set(expense.occurred_at),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            group_id: model.group_id,
            description: model.description,
            amount: MoneyCents::new(model.amount_cents),
            paid_by: model.paid_by,
            kind: SplitKind::try_from(model.split_kind.as_str())?,
            category: model.category,
            note: model.note,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
            shares: Vec::new(),
        })
    }
}
