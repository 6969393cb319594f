use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS staffing_platform;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO staffing_platform, public;")
            .await?;

        // Grant the application DB user access to everything in the schema
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE staffing TO staffing;
                    GRANT ALL ON SCHEMA staffing_platform TO staffing;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA staffing_platform GRANT ALL ON TABLES TO staffing;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA staffing_platform GRANT ALL ON SEQUENCES TO staffing;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA staffing_platform GRANT ALL ON FUNCTIONS TO staffing;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA staffing_platform REVOKE ALL ON FUNCTIONS FROM staffing;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA staffing_platform REVOKE ALL ON SEQUENCES FROM staffing;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA staffing_platform REVOKE ALL ON TABLES FROM staffing;
                    REVOKE ALL ON SCHEMA staffing_platform FROM staffing;
                    REVOKE ALL PRIVILEGES ON DATABASE staffing FROM staffing;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS staffing_platform CASCADE;")
            .await?;

        Ok(())
    }
}
