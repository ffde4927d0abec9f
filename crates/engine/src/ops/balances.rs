//! Balance reads.

use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{BalanceSheet, ResultEngine, balances};

use super::{Engine, with_tx};

impl Engine {
    /// Net balance of every group member, recomputed from the full record
    /// history inside one DB transaction. Nothing is cached, so a crashed or
    /// concurrent write can never leave a stale sum behind.
    pub async fn balances(&self, group_id: Uuid) -> ResultEngine<BalanceSheet> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let members = self.group_members(&db_tx, group_id).await?;
            let expenses = self.group_expenses(&db_tx, group_id).await?;
            balances::aggregate(group_id, &members, &expenses)
        })
    }
}
