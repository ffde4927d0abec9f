//! SQLite-backed engine operations.
//!
//! Every write runs inside one DB transaction via [`with_tx!`]; every balance
//! read recomputes from the full record history. The engine never persists a
//! derived balance.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{Expense, Group, Member, MoneyCents, SplitKind, shares::ShareSpec};

mod access;
mod balances;
mod expenses;
mod groups;
mod settlements;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// A group together with its members, in join order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupView {
    pub group: Group,
    pub members: Vec<Member>,
}

/// One participant of a new or updated expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticipantInput {
    pub member_id: Uuid,
    pub spec: ShareSpec,
}

/// Input for creating a shared-cost expense.
///
/// An empty participant list on an equal split means "split among all group
/// members", mirroring the usual client shortcut.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewExpense {
    pub description: String,
    pub amount: MoneyCents,
    pub paid_by: Uuid,
    pub kind: SplitKind,
    pub participants: Vec<ParticipantInput>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing expense. `None` keeps the stored value.
///
/// The split kind of a record is fixed at creation; changing how an amount
/// was split means replacing the participants, not the kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub paid_by: Option<Uuid>,
    pub participants: Option<Vec<ParticipantInput>>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// A settlement accepted and persisted by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedSettlement {
    pub expense: Expense,
    /// Suggested maximum when the user paid more than was owed.
    pub overpaid: Option<MoneyCents>,
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
