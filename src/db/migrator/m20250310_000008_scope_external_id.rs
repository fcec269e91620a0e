use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

pub const LEGACY_INDEX: &str = "idx_movies_external_id";
pub const SCOPED_INDEX: &str = "idx_movies_owner_external";

/// Replaces the catalog-wide uniqueness of `external_id` with per-owner
/// uniqueness. Rows without an owner or an external id are not constrained.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {LEGACY_INDEX}"))
            .await?;

        conn.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {SCOPED_INDEX} ON movies(owner_id, external_id) \
             WHERE owner_id IS NOT NULL AND external_id IS NOT NULL"
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared(&format!("DROP INDEX IF EXISTS {SCOPED_INDEX}"))
            .await?;

        conn.execute_unprepared(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {LEGACY_INDEX} ON movies(external_id)"
        ))
        .await?;

        Ok(())
    }
}
