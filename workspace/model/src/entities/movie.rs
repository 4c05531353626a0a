use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DeleteResult, ModelTrait, QueryFilter, QueryOrder};

use super::user_movie::MovieListKind;
use super::{user, user_movie};

/// Lowest rating a movie can be created with.
pub const MIN_RATING: f64 = 0.0;
/// Highest rating a movie can be created with.
pub const MAX_RATING: f64 = 5.0;

/// A movie users can mark as watched or interesting.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Between `MIN_RATING` and `MAX_RATING` inclusive.
    pub rating: f64,
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_movie::Entity")]
    UserMovie,
}

impl Related<user_movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserMovie.def()
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        user_movie::Relation::User.def()
    }
    fn via() -> Option<RelationDef> {
        Some(user_movie::Relation::Movie.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Returns true when `rating` lies within the accepted range.
pub fn rating_in_range(rating: f64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

impl Model {
    /// Users that have this movie on the given list, in the order they added it.
    pub async fn users<C: ConnectionTrait>(
        &self,
        db: &C,
        kind: MovieListKind,
    ) -> Result<Vec<user::Model>, DbErr> {
        let rows = user_movie::Entity::find()
            .filter(user_movie::Column::MovieId.eq(self.id))
            .filter(user_movie::Column::Kind.eq(kind))
            .order_by_asc(user_movie::Column::Id)
            .find_also_related(user::Entity)
            .all(db)
            .await?;

        Ok(rows.into_iter().filter_map(|(_, user)| user).collect())
    }

    /// Deletes the movie and removes it from every user's lists.
    pub async fn delete_with_relations<C: ConnectionTrait>(
        self,
        db: &C,
    ) -> Result<DeleteResult, DbErr> {
        user_movie::Entity::delete_many()
            .filter(user_movie::Column::MovieId.eq(self.id))
            .exec(db)
            .await?;

        self.delete(db).await
    }
}
