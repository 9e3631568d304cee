//! Migration: Create messages table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::SenderId).big_integer().not_null())
                    .col(ColumnDef::new(Messages::ReceiverId).big_integer().not_null())
                    .col(ColumnDef::new(Messages::Text).text().null())
                    .col(ColumnDef::new(Messages::FileUrl).string().null())
                    .col(ColumnDef::new(Messages::FileType).string().null())
                    .col(
                        ColumnDef::new(Messages::Seen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Messages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_messages_pair")
                    .table(Messages::Table)
                    .col(Messages::SenderId)
                    .col(Messages::ReceiverId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Messages {
    Table,
    Id,
    #[iden = "sender_id"]
    SenderId,
    #[iden = "receiver_id"]
    ReceiverId,
    Text,
    #[iden = "file_url"]
    FileUrl,
    #[iden = "file_type"]
    FileType,
    Seen,
    #[iden = "created_at"]
    CreatedAt,
}
