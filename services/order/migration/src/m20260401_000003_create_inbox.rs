use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Inbox::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Inbox::MessageId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Inbox::SenderId).string())
                    .col(ColumnDef::new(Inbox::EventType).string().not_null())
                    .col(ColumnDef::new(Inbox::Payload).json_binary().not_null())
                    .col(
                        ColumnDef::new(Inbox::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Inbox::RetryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Inbox::Exchange).string())
                    .col(ColumnDef::new(Inbox::RoutingKey).string())
                    .col(ColumnDef::new(Inbox::Error).text())
                    .col(ColumnDef::new(Inbox::LockedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Inbox::LockedBy).string())
                    .col(
                        ColumnDef::new(Inbox::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Inbox::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Inbox::Table)
                    .col(Inbox::Status)
                    .name("idx_inbox_status")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Inbox::Table)
                    .col(Inbox::LockedAt)
                    .name("idx_inbox_locked_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Inbox::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Inbox {
    Table,
    Id,
    MessageId,
    SenderId,
    EventType,
    Payload,
    Status,
    RetryCount,
    Exchange,
    RoutingKey,
    Error,
    LockedAt,
    LockedBy,
    CreatedAt,
    UpdatedAt,
}
