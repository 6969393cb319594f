use sea_orm_migration::prelude::*;

/// Adds the job/application/agency linkage columns to call_rooms and the
/// storage migration columns to call_recordings.
///
/// Deployments that have not run this migration yet reject queries naming
/// these columns, which is why the room lookup and recording insert paths
/// carry a minimal-column fallback.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE staffing_platform.call_rooms
                    ADD COLUMN IF NOT EXISTS job_id UUID,
                    ADD COLUMN IF NOT EXISTS application_id UUID,
                    ADD COLUMN IF NOT EXISTS agency_id UUID
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_call_rooms_application_id
                    ON staffing_platform.call_rooms(application_id)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE staffing_platform.call_recordings
                    ADD COLUMN IF NOT EXISTS storage_provider VARCHAR(64),
                    ADD COLUMN IF NOT EXISTS url_expires_at TIMESTAMPTZ
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE staffing_platform.call_recordings
                    DROP COLUMN IF EXISTS url_expires_at,
                    DROP COLUMN IF EXISTS storage_provider
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "DROP INDEX IF EXISTS staffing_platform.idx_call_rooms_application_id",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
                ALTER TABLE staffing_platform.call_rooms
                    DROP COLUMN IF EXISTS agency_id,
                    DROP COLUMN IF EXISTS application_id,
                    DROP COLUMN IF EXISTS job_id
            "#,
            )
            .await?;

        Ok(())
    }
}
