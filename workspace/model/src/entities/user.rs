use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DeleteResult, ModelTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, instrument};

use super::user_movie::MovieListKind;
use super::{event, movie, user_event, user_movie};

/// Represents a registered user of the tracker.
///
/// The password is kept verbatim; it is never serialized back to clients.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub username: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user can host many events; every event has at most one host.
    #[sea_orm(has_many = "super::event::Entity")]
    HostedEvent,
    #[sea_orm(has_many = "super::user_movie::Entity")]
    UserMovie,
    #[sea_orm(has_many = "super::user_event::Entity")]
    UserEvent,
}

impl Related<event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HostedEvent.def()
    }
}

impl Related<user_movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserMovie.def()
    }
}

impl Related<user_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserEvent.def()
    }
}

impl Related<movie::Entity> for Entity {
    fn to() -> RelationDef {
        user_movie::Relation::Movie.def()
    }
    fn via() -> Option<RelationDef> {
        Some(user_movie::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Movies on one of this user's lists, in the order they were added.
    /// A movie added twice appears twice.
    pub async fn movies<C: ConnectionTrait>(
        &self,
        db: &C,
        kind: MovieListKind,
    ) -> Result<Vec<movie::Model>, DbErr> {
        let rows = user_movie::Entity::find()
            .filter(user_movie::Column::UserId.eq(self.id))
            .filter(user_movie::Column::Kind.eq(kind))
            .order_by_asc(user_movie::Column::Id)
            .find_also_related(movie::Entity)
            .all(db)
            .await?;

        Ok(rows.into_iter().filter_map(|(_, movie)| movie).collect())
    }

    /// Events this user hosts, ordered by id.
    pub async fn hosted_events<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<event::Model>, DbErr> {
        self.find_related(event::Entity)
            .order_by_asc(event::Column::Id)
            .all(db)
            .await
    }

    /// Events this user marked as interesting, in the order they were added.
    pub async fn interested_events<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<Vec<event::Model>, DbErr> {
        let rows = user_event::Entity::find()
            .filter(user_event::Column::UserId.eq(self.id))
            .order_by_asc(user_event::Column::Id)
            .find_also_related(event::Entity)
            .all(db)
            .await?;

        Ok(rows.into_iter().filter_map(|(_, event)| event).collect())
    }

    /// Appends a movie to one of this user's lists.
    #[instrument(skip(self, db), fields(user_id = self.id))]
    pub async fn add_movie<C: ConnectionTrait>(
        &self,
        db: &C,
        movie_id: i32,
        kind: MovieListKind,
    ) -> Result<user_movie::Model, DbErr> {
        debug!("Linking movie {} as {:?}", movie_id, kind);
        user_movie::ActiveModel {
            user_id: Set(self.id),
            movie_id: Set(movie_id),
            kind: Set(kind),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Marks this user as interested in an event.
    #[instrument(skip(self, db), fields(user_id = self.id))]
    pub async fn add_interested_event<C: ConnectionTrait>(
        &self,
        db: &C,
        event_id: i32,
    ) -> Result<user_event::Model, DbErr> {
        debug!("Linking interested event {}", event_id);
        user_event::ActiveModel {
            user_id: Set(self.id),
            event_id: Set(event_id),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// Makes this user the host of an event, replacing any previous host.
    #[instrument(skip(self, db, event), fields(user_id = self.id, event_id = event.id))]
    pub async fn host_event<C: ConnectionTrait>(
        &self,
        db: &C,
        event: event::Model,
    ) -> Result<event::Model, DbErr> {
        if let Some(previous) = event.host_id.filter(|host| *host != self.id) {
            debug!("Replacing previous host {}", previous);
        }
        let mut active: event::ActiveModel = event.into();
        active.host_id = Set(Some(self.id));
        active.update(db).await
    }

    /// Deletes the user together with its list memberships.
    /// Events it hosted are kept but lose their host.
    #[instrument(skip(self, db), fields(user_id = self.id))]
    pub async fn delete_with_relations<C: ConnectionTrait>(
        self,
        db: &C,
    ) -> Result<DeleteResult, DbErr> {
        let movies = user_movie::Entity::delete_many()
            .filter(user_movie::Column::UserId.eq(self.id))
            .exec(db)
            .await?;
        let events = user_event::Entity::delete_many()
            .filter(user_event::Column::UserId.eq(self.id))
            .exec(db)
            .await?;
        let hosted = event::Entity::update_many()
            .col_expr(event::Column::HostId, Expr::value(Option::<i32>::None))
            .filter(event::Column::HostId.eq(self.id))
            .exec(db)
            .await?;
        debug!(
            "Removed {} movie links, {} event links, unhosted {} events",
            movies.rows_affected, events.rows_affected, hosted.rows_affected
        );

        self.delete(db).await
    }
}
