//! Migration: Create users and push_tokens tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().null().unique_key())
                    .col(ColumnDef::new(Users::HashedPassword).string().null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("client"),
                    )
                    .col(
                        ColumnDef::new(Users::LoginMethod)
                            .string()
                            .not_null()
                            .default("email"),
                    )
                    .col(
                        ColumnDef::new(Users::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsBlocked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsLoggedIn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::LoggedOutTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::PasswordChangeTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Users::SentOtp).string().null())
                    .col(
                        ColumnDef::new(Users::OtpVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::AllowPasswordChange)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::NotificationsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::AgreedToTerms)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PushTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PushTokens::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PushTokens::UserId).big_integer().not_null())
                    .col(ColumnDef::new(PushTokens::Token).string().not_null())
                    .col(
                        ColumnDef::new(PushTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_push_tokens_user")
                            .from(PushTokens::Table, PushTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_push_tokens_user_token")
                    .table(PushTokens::Table)
                    .col(PushTokens::UserId)
                    .col(PushTokens::Token)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PushTokens::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Name,
    Email,
    #[iden = "hashed_password"]
    HashedPassword,
    Role,
    #[iden = "login_method"]
    LoginMethod,
    #[iden = "is_deleted"]
    IsDeleted,
    #[iden = "is_blocked"]
    IsBlocked,
    #[iden = "is_logged_in"]
    IsLoggedIn,
    #[iden = "logged_out_time"]
    LoggedOutTime,
    #[iden = "password_change_time"]
    PasswordChangeTime,
    #[iden = "sent_otp"]
    SentOtp,
    #[iden = "otp_verified"]
    OtpVerified,
    #[iden = "allow_password_change"]
    AllowPasswordChange,
    #[iden = "notifications_enabled"]
    NotificationsEnabled,
    #[iden = "agreed_to_terms"]
    AgreedToTerms,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

#[derive(Iden)]
pub enum PushTokens {
    #[iden = "push_tokens"]
    Table,
    Id,
    #[iden = "user_id"]
    UserId,
    Token,
    #[iden = "created_at"]
    CreatedAt,
}
