use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Outbox::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Outbox::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Outbox::MessageId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Outbox::EventType).string().not_null())
                    .col(ColumnDef::new(Outbox::Payload).json_binary().not_null())
                    .col(
                        ColumnDef::new(Outbox::Status)
                            .string()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Outbox::RetryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Outbox::Exchange).string())
                    .col(ColumnDef::new(Outbox::RoutingKey).string())
                    .col(ColumnDef::new(Outbox::Error).text())
                    .col(ColumnDef::new(Outbox::LockedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Outbox::LockedBy).string())
                    .col(
                        ColumnDef::new(Outbox::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Outbox::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Lease queries filter on status and locked_at; message_id is covered
        // by its unique constraint.
        manager
            .create_index(
                Index::create()
                    .table(Outbox::Table)
                    .col(Outbox::Status)
                    .name("idx_outbox_status")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Outbox::Table)
                    .col(Outbox::LockedAt)
                    .name("idx_outbox_locked_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Outbox::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Outbox {
    Table,
    Id,
    MessageId,
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
