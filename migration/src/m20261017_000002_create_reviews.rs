//! 创建 `reviews` 表。
//!
//! `game_id` 唯一（每个游戏最多一条评测），删除游戏时级联删除。

use sea_orm_migration::prelude::*;

use crate::m20261017_000001_create_games::Games;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::GameId).integer().not_null())
                    .col(ColumnDef::new(Reviews::Score).integer().not_null().default(0))
                    .col(ColumnDef::new(Reviews::Text).text().not_null())
                    .col(
                        ColumnDef::new(Reviews::HoursPlayed)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(Reviews::Difficulty).text().not_null())
                    .col(
                        ColumnDef::new(Reviews::Recommended)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_game_id")
                            .from(Reviews::Table, Reviews::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("idx_reviews_game_id")
                    .table(Reviews::Table)
                    .col(Reviews::GameId)
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_reviews_score", Reviews::Score),
            ("idx_reviews_difficulty", Reviews::Difficulty),
            ("idx_reviews_recommended", Reviews::Recommended),
            ("idx_reviews_created_at", Reviews::CreatedAt),
            ("idx_reviews_hours_played", Reviews::HoursPlayed),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Reviews::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    GameId,
    Score,
    Text,
    HoursPlayed,
    Difficulty,
    Recommended,
    CreatedAt,
    UpdatedAt,
}
