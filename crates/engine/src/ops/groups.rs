//! Group and member operations.
//!
//! Plumbing around the ledger core: groups and members only exist so expense
//! records have something to attach to. Roles, invitations and authentication
//! live outside this engine.

use chrono::Utc;
use sea_orm::{QueryFilter, Statement, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Group, Member, ResultEngine, groups, members,
    util::normalize_required_name,
};

use super::{Engine, GroupView, with_tx};

impl Engine {
    /// Create a new group.
    pub async fn new_group(&self, name: &str, currency: Option<Currency>) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "group")?;
        let group = Group::new(name, currency.unwrap_or_default(), Utc::now());
        let group_id = group.id;

        let model: groups::ActiveModel = (&group).into();
        with_tx!(self, |db_tx| {
            match model.insert(&db_tx).await {
                Ok(_) => Ok(group_id),
                Err(err) => Err(EngineError::from(err)),
            }
        })
    }

    /// Add a member to a group. Display names are unique per group.
    pub async fn add_member(&self, group_id: Uuid, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "member")?;

        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;

            let exists = members::Entity::find()
                .filter(members::Column::GroupId.eq(group_id))
                .filter(members::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let member = Member::new(group_id, name, Utc::now());
            let member_id = member.id;
            let model: members::ActiveModel = (&member).into();
            model.insert(&db_tx).await?;
            Ok(member_id)
        })
    }

    /// Return a group with its members in join order.
    pub async fn group(&self, group_id: Uuid) -> ResultEngine<GroupView> {
        with_tx!(self, |db_tx| {
            let group_model = self.require_group(&db_tx, group_id).await?;
            let members = self.group_members(&db_tx, group_id).await?;
            Ok(GroupView {
                group: Group::try_from(group_model)?,
                members,
            })
        })
    }

    /// Delete a group with its full history.
    pub async fn delete_group(&self, group_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;

            // Explicit cascade inside one DB transaction; SQLite foreign-key
            // enforcement is off by default, so we do not rely on it.
            let backend = self.database.get_database_backend();
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expense_shares WHERE expense_id IN \
                     (SELECT id FROM expenses WHERE group_id = ?);",
                    vec![group_id.into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM expenses WHERE group_id = ?;",
                    vec![group_id.into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM members WHERE group_id = ?;",
                    vec![group_id.into()],
                ))
                .await?;
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM groups WHERE id = ?;",
                    vec![group_id.into()],
                ))
                .await?;

            Ok(())
        })
    }
}
