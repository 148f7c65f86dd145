//! 创建 `games` 表及其查询索引。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Games::Title).text().not_null())
                    .col(ColumnDef::new(Games::Genre).text().not_null())
                    .col(ColumnDef::new(Games::Platform).text().not_null())
                    .col(ColumnDef::new(Games::ReleaseYear).integer().not_null())
                    .col(ColumnDef::new(Games::Developer).text().not_null())
                    .col(ColumnDef::new(Games::CoverImage).text().not_null())
                    .col(ColumnDef::new(Games::Description).text().not_null())
                    .col(
                        ColumnDef::new(Games::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Games::SearchText)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_games_title", Games::Title),
            ("idx_games_genre", Games::Genre),
            ("idx_games_platform", Games::Platform),
            ("idx_games_completed", Games::Completed),
            ("idx_games_created_at", Games::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Games::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Games {
    Table,
    Id,
    Title,
    Genre,
    Platform,
    ReleaseYear,
    Developer,
    CoverImage,
    Description,
    Completed,
    SearchText,
    CreatedAt,
    UpdatedAt,
}
