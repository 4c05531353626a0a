use super::{movie, user};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which of a user's movie lists a junction row belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum MovieListKind {
    #[sea_orm(string_value = "watched")]
    Watched,
    #[sea_orm(string_value = "interested")]
    Interested,
}

impl FromStr for MovieListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watched" => Ok(Self::Watched),
            "interested" => Ok(Self::Interested),
            other => Err(format!("Unknown movie list '{}'", other)),
        }
    }
}

/// Junction row linking a user to a movie they watched or are interested in.
/// The (user, movie, kind) triple is not unique; repeated adds produce repeated rows.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub movie_id: i32,
    pub kind: MovieListKind,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "movie::Entity",
        from = "Column::MovieId",
        to = "movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
