//! Migration: Create asset and timeline tables attached to cases

use sea_orm_migration::prelude::*;

use super::m20261018_000003_create_cases::CaseOverviews;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AssetLists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssetLists::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssetLists::CaseId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(AssetLists::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(AssetLists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_asset_lists_case")
                            .from(AssetLists::Table, AssetLists::CaseId)
                            .to(CaseOverviews::Table, CaseOverviews::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assets::AssetListId).big_integer().not_null())
                    .col(ColumnDef::new(Assets::Url).string().not_null())
                    .col(ColumnDef::new(Assets::Name).string().not_null())
                    .col(
                        ColumnDef::new(Assets::Size)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Assets::UploadDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assets_asset_list")
                            .from(Assets::Table, Assets::AssetListId)
                            .to(AssetLists::Table, AssetLists::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TimelineLists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimelineLists::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TimelineLists::CaseId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TimelineLists::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(TimelineLists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_lists_case")
                            .from(TimelineLists::Table, TimelineLists::CaseId)
                            .to(CaseOverviews::Table, CaseOverviews::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TimelineEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimelineEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TimelineEntries::TimelineListId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimelineEntries::Title).string().not_null())
                    .col(ColumnDef::new(TimelineEntries::Description).text().not_null())
                    .col(
                        ColumnDef::new(TimelineEntries::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TimelineEntries::AssetUrls).json().not_null())
                    .col(
                        ColumnDef::new(TimelineEntries::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_entries_list")
                            .from(TimelineEntries::Table, TimelineEntries::TimelineListId)
                            .to(TimelineLists::Table, TimelineLists::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TimelineEntries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TimelineLists::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssetLists::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AssetLists {
    #[iden = "asset_lists"]
    Table,
    Id,
    #[iden = "case_id"]
    CaseId,
    #[iden = "is_deleted"]
    IsDeleted,
    #[iden = "created_at"]
    CreatedAt,
}

#[derive(Iden)]
pub enum Assets {
    Table,
    Id,
    #[iden = "asset_list_id"]
    AssetListId,
    Url,
    Name,
    Size,
    #[iden = "upload_date"]
    UploadDate,
}

#[derive(Iden)]
pub enum TimelineLists {
    #[iden = "timeline_lists"]
    Table,
    Id,
    #[iden = "case_id"]
    CaseId,
    #[iden = "is_deleted"]
    IsDeleted,
    #[iden = "created_at"]
    CreatedAt,
}

#[derive(Iden)]
pub enum TimelineEntries {
    #[iden = "timeline_entries"]
    Table,
    Id,
    #[iden = "timeline_list_id"]
    TimelineListId,
    Title,
    Description,
    Date,
    #[iden = "asset_urls"]
    AssetUrls,
    #[iden = "is_deleted"]
    IsDeleted,
}
