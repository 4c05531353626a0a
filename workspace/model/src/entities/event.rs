use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DeleteResult, ModelTrait, QueryFilter, QueryOrder};
use std::str::FromStr;

use super::{user, user_event};

/// How a user relates to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventRole {
    Host,
    Interested,
}

impl FromStr for EventRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(Self::Host),
            "interested" => Ok(Self::Interested),
            other => Err(format!("Unknown event role '{}'", other)),
        }
    }
}

/// A scheduled showing or gathering. One row per showing: a film screened
/// three times is three events sharing a name.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub location: String,
    pub start: DateTimeWithTimeZone,
    pub end: DateTimeWithTimeZone,
    /// The hosting user, if any.
    pub host_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::HostId",
        to = "user::Column::Id",
        on_delete = "SetNull"
    )]
    Host,
    #[sea_orm(has_many = "super::user_event::Entity")]
    UserEvent,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Host.def()
    }
}

impl Related<user_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The hosting user, if the event has one.
    pub async fn host<C: ConnectionTrait>(&self, db: &C) -> Result<Option<user::Model>, DbErr> {
        self.find_related(user::Entity).one(db).await
    }

    /// Users interested in this event, in the order they signed up.
    pub async fn interested_users<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<user::Model>, DbErr> {
        let rows = user_event::Entity::find()
            .filter(user_event::Column::EventId.eq(self.id))
            .order_by_asc(user_event::Column::Id)
            .find_also_related(user::Entity)
            .all(db)
            .await?;

        Ok(rows.into_iter().filter_map(|(_, user)| user).collect())
    }

    /// Deletes the event and every interest marker pointing at it.
    pub async fn delete_with_relations<C: ConnectionTrait>(
        self,
        db: &C,
    ) -> Result<DeleteResult, DbErr> {
        user_event::Entity::delete_many()
            .filter(user_event::Column::EventId.eq(self.id))
            .exec(db)
            .await?;

        self.delete(db).await
    }
}
