//! Migration: Create case_overviews, case_counters and profile_cases tables

use sea_orm_migration::prelude::*;

use super::m20261018_000002_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CaseOverviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CaseOverviews::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CaseOverviews::CaseNumber)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CaseOverviews::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(CaseOverviews::ClientUserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CaseOverviews::ClientName).string().not_null())
                    .col(ColumnDef::new(CaseOverviews::Title).string().null())
                    .col(ColumnDef::new(CaseOverviews::CaseType).string().not_null())
                    .col(ColumnDef::new(CaseOverviews::CaseStatus).string().not_null())
                    .col(ColumnDef::new(CaseOverviews::CourtDate).date().null())
                    .col(ColumnDef::new(CaseOverviews::Note).text().null())
                    .col(ColumnDef::new(CaseOverviews::AssetListId).big_integer().null())
                    .col(
                        ColumnDef::new(CaseOverviews::TimelineListId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CaseOverviews::IsMailSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CaseOverviews::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CaseOverviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CaseOverviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_case_overviews_owner")
                    .table(CaseOverviews::Table)
                    .col(CaseOverviews::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_case_overviews_client")
                    .table(CaseOverviews::Table)
                    .col(CaseOverviews::ClientUserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_case_overviews_court_date")
                    .table(CaseOverviews::Table)
                    .col(CaseOverviews::CourtDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CaseCounters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CaseCounters::Year)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CaseCounters::Seq)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProfileCases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProfileCases::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProfileCases::ProfileId).big_integer().not_null())
                    .col(ColumnDef::new(ProfileCases::CaseId).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_cases_profile")
                            .from(ProfileCases::Table, ProfileCases::ProfileId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_cases_case")
                            .from(ProfileCases::Table, ProfileCases::CaseId)
                            .to(CaseOverviews::Table, CaseOverviews::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profile_cases_pair")
                    .table(ProfileCases::Table)
                    .col(ProfileCases::ProfileId)
                    .col(ProfileCases::CaseId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProfileCases::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CaseCounters::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CaseOverviews::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum CaseOverviews {
    #[iden = "case_overviews"]
    Table,
    Id,
    #[iden = "case_number"]
    CaseNumber,
    #[iden = "user_id"]
    UserId,
    #[iden = "client_user_id"]
    ClientUserId,
    #[iden = "client_name"]
    ClientName,
    Title,
    #[iden = "case_type"]
    CaseType,
    #[iden = "case_status"]
    CaseStatus,
    #[iden = "court_date"]
    CourtDate,
    Note,
    #[iden = "asset_list_id"]
    AssetListId,
    #[iden = "timeline_list_id"]
    TimelineListId,
    #[iden = "is_mail_sent"]
    IsMailSent,
    #[iden = "is_deleted"]
    IsDeleted,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

#[derive(Iden)]
pub enum CaseCounters {
    #[iden = "case_counters"]
    Table,
    Year,
    Seq,
}

#[derive(Iden)]
pub enum ProfileCases {
    #[iden = "profile_cases"]
    Table,
    Id,
    #[iden = "profile_id"]
    ProfileId,
    #[iden = "case_id"]
    CaseId,
}
