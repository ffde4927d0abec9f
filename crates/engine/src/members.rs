//! Group members.
//!
//! A [`Member`] is an identity inside one group: an opaque id plus a display
//! name. Members deliberately carry **no** stored balance; balances are a
//! derived value, recomputed from the expense history on every read.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(group_id: Uuid, name: String, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            name,
            joined_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub joined_at: DateTimeUtc,
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
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Member> for ActiveModel {
    fn from(member: &Member) -> Self {
        Self {
            id: ActiveValue::Set(member.id),
            group_id: ActiveValue::Set(member.group_id),
            name: ActiveValue::Set(member.name.clone()),
            joined_at: ActiveValue::Set(member.joined_at),
        }
    }
}

impl From<Model> for Member {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group_id: model.group_id,
            name: model.name,
            joined_at: model.joined_at,
        }
    }
}
