use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Demo catalogue so a fresh deployment can take orders immediately.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                INSERT INTO inventory (id, product_id, product_name, quantity, reserved, created_at, updated_at)
                VALUES
                    (gen_random_uuid(), 'PROD-001', 'Laptop', 100, 0, NOW(), NOW()),
                    (gen_random_uuid(), 'PROD-002', 'Monitor', 50, 0, NOW(), NOW()),
                    (gen_random_uuid(), 'PROD-003', 'Keyboard', 200, 0, NOW(), NOW()),
                    (gen_random_uuid(), 'PROD-004', 'Mouse', 150, 0, NOW(), NOW()),
                    (gen_random_uuid(), 'PROD-005', 'Headphones', 75, 0, NOW(), NOW())
                ON CONFLICT (product_id) DO NOTHING
                "#,
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DELETE FROM inventory WHERE product_id IN \
                 ('PROD-001', 'PROD-002', 'PROD-003', 'PROD-004', 'PROD-005')",
            )
            .await?;
        Ok(())
    }
}
