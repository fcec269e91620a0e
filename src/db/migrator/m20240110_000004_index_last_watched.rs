use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Unguarded; a re-run surfaces as AlreadyExists and is skipped.
        manager
            .get_connection()
            .execute_unprepared("CREATE INDEX idx_movies_last_watched ON movies(last_watched_at)")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_movies_last_watched")
            .await?;

        Ok(())
    }
}
