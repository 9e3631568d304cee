//! Migration: Create notifications and notification_lists tables

use sea_orm_migration::prelude::*;

use super::m20261018_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::ProfileId).big_integer().null())
                    .col(ColumnDef::new(Notifications::Kind).string().not_null())
                    .col(ColumnDef::new(Notifications::Detail).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::IsSeen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_user")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_created")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationLists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NotificationLists::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NotificationLists::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(NotificationLists::ProfileId).big_integer().null())
                    .col(
                        ColumnDef::new(NotificationLists::OldNotificationCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(NotificationLists::NewNotification)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(NotificationLists::SeenNotificationCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(NotificationLists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NotificationLists::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_lists_user")
                            .from(NotificationLists::Table, NotificationLists::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NotificationLists::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Notifications::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Notifications {
    Table,
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "profile_id"]
    ProfileId,
    Kind,
    Detail,
    #[iden = "is_seen"]
    IsSeen,
    #[iden = "created_at"]
    CreatedAt,
}

#[derive(Iden)]
pub enum NotificationLists {
    #[iden = "notification_lists"]
    Table,
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "profile_id"]
    ProfileId,
    #[iden = "old_notification_count"]
    OldNotificationCount,
    #[iden = "new_notification"]
    NewNotification,
    #[iden = "seen_notification_count"]
    SeenNotificationCount,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
