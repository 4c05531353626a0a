use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username))
                    .col(string(Users::Password))
                    .to_owned(),
            )
            .await?;

        // Create movies table
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::Name))
                    .col(double(Movies::Rating))
                    .col(string(Movies::Description))
                    .to_owned(),
            )
            .await?;

        // Create events table; a hosting user owns many events
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_auto(Events::Id))
                    .col(string(Events::Name))
                    .col(string(Events::Location))
                    .col(timestamp_with_time_zone(Events::Start))
                    .col(timestamp_with_time_zone(Events::End))
                    .col(integer_null(Events::HostId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_host")
                            .from(Events::Table, Events::HostId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_movies table (join table, pairs may repeat)
        manager
            .create_table(
                Table::create()
                    .table(UserMovies::Table)
                    .if_not_exists()
                    .col(pk_auto(UserMovies::Id))
                    .col(integer(UserMovies::UserId))
                    .col(integer(UserMovies::MovieId))
                    .col(string(UserMovies::Kind))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_movies_user")
                            .from(UserMovies::Table, UserMovies::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_movies_movie")
                            .from(UserMovies::Table, UserMovies::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create user_events table (join table for interested users)
        manager
            .create_table(
                Table::create()
                    .table(UserEvents::Table)
                    .if_not_exists()
                    .col(pk_auto(UserEvents::Id))
                    .col(integer(UserEvents::UserId))
                    .col(integer(UserEvents::EventId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_events_user")
                            .from(UserEvents::Table, UserEvents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_events_event")
                            .from(UserEvents::Table, UserEvents::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_movies_user")
                    .if_not_exists()
                    .table(UserMovies::Table)
                    .col(UserMovies::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_events_user")
                    .if_not_exists()
                    .table(UserEvents::Table)
                    .col(UserEvents::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserMovies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Password,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Name,
    Rating,
    Description,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Name,
    Location,
    Start,
    End,
    HostId,
}

#[derive(DeriveIden)]
enum UserMovies {
    Table,
    Id,
    UserId,
    MovieId,
    Kind,
}

#[derive(DeriveIden)]
enum UserEvents {
    Table,
    Id,
    UserId,
    EventId,
}
