use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create call_room_status enum
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE staffing_platform.call_room_status AS ENUM (
                    'created',
                    'waiting',
                    'active',
                    'ended'
                )",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TYPE staffing_platform.call_room_status OWNER TO staffing")
            .await?;

        // Create call_recording_status enum
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE staffing_platform.call_recording_status AS ENUM (
                    'processing',
                    'ready',
                    'failed'
                )",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TYPE staffing_platform.call_recording_status OWNER TO staffing",
            )
            .await?;

        // Create call_participant_status enum
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE staffing_platform.call_participant_status AS ENUM (
                    'joined',
                    'left'
                )",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TYPE staffing_platform.call_participant_status OWNER TO staffing",
            )
            .await?;

        // Create call_participant_role enum
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE staffing_platform.call_participant_role AS ENUM (
                    'host',
                    'candidate',
                    'participant'
                )",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TYPE staffing_platform.call_participant_role OWNER TO staffing",
            )
            .await?;

        // Create call_transcript_status enum
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE staffing_platform.call_transcript_status AS ENUM (
                    'queued',
                    'processing',
                    'completed',
                    'failed'
                )",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TYPE staffing_platform.call_transcript_status OWNER TO staffing",
            )
            .await?;

        // Create users table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS staffing_platform.users (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    email VARCHAR(255) NOT NULL UNIQUE,
                    first_name VARCHAR(255) NOT NULL,
                    last_name VARCHAR(255) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
            )
            .await?;

        // Create candidate_profiles table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS staffing_platform.candidate_profiles (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    user_id UUID NOT NULL UNIQUE
                        REFERENCES staffing_platform.users(id) ON DELETE CASCADE,
                    full_name VARCHAR(255) NOT NULL,
                    headline TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
            )
            .await?;

        // Create call_rooms table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS staffing_platform.call_rooms (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    daily_room_name VARCHAR(255) NOT NULL UNIQUE,
                    host_user_id UUID NOT NULL
                        REFERENCES staffing_platform.users(id),
                    candidate_user_id UUID
                        REFERENCES staffing_platform.users(id),
                    status staffing_platform.call_room_status NOT NULL DEFAULT 'created',
                    transcription_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                    started_at TIMESTAMPTZ,
                    ended_at TIMESTAMPTZ,
                    duration_seconds INTEGER,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_call_rooms_daily_room_name
                    ON staffing_platform.call_rooms(daily_room_name)",
            )
            .await?;

        // Create call_recordings table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS staffing_platform.call_recordings (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    call_room_id UUID NOT NULL
                        REFERENCES staffing_platform.call_rooms(id) ON DELETE CASCADE,
                    daily_recording_id VARCHAR(255) NOT NULL UNIQUE,
                    status staffing_platform.call_recording_status NOT NULL DEFAULT 'processing',
                    storage_key TEXT,
                    duration_seconds INTEGER,
                    download_url TEXT,
                    error_message TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_call_recordings_call_room_id
                    ON staffing_platform.call_recordings(call_room_id)",
            )
            .await?;

        // Create call_participants table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS staffing_platform.call_participants (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    call_room_id UUID NOT NULL
                        REFERENCES staffing_platform.call_rooms(id) ON DELETE CASCADE,
                    user_id UUID
                        REFERENCES staffing_platform.users(id),
                    display_name VARCHAR(255) NOT NULL,
                    role staffing_platform.call_participant_role NOT NULL DEFAULT 'participant',
                    status staffing_platform.call_participant_status NOT NULL DEFAULT 'joined',
                    joined_at TIMESTAMPTZ,
                    left_at TIMESTAMPTZ,
                    duration_seconds INTEGER,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_call_participants_call_room_id
                    ON staffing_platform.call_participants(call_room_id)",
            )
            .await?;

        // Create call_transcripts table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS staffing_platform.call_transcripts (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    call_recording_id UUID NOT NULL
                        REFERENCES staffing_platform.call_recordings(id) ON DELETE CASCADE,
                    call_room_id UUID NOT NULL
                        REFERENCES staffing_platform.call_rooms(id) ON DELETE CASCADE,
                    status staffing_platform.call_transcript_status NOT NULL DEFAULT 'queued',
                    full_text TEXT,
                    summary TEXT,
                    key_points JSONB,
                    word_count INTEGER,
                    error_message TEXT,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_call_transcripts_call_recording_id
                    ON staffing_platform.call_transcripts(call_recording_id)",
            )
            .await?;

        // Create call_invitations table
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE IF NOT EXISTS staffing_platform.call_invitations (
                    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                    call_room_id UUID NOT NULL
                        REFERENCES staffing_platform.call_rooms(id) ON DELETE CASCADE,
                    candidate_email VARCHAR(255) NOT NULL,
                    token VARCHAR(255) NOT NULL UNIQUE,
                    expires_at TIMESTAMPTZ NOT NULL,
                    accepted_at TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_call_invitations_call_room_id
                    ON staffing_platform.call_invitations(call_room_id)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            "call_invitations",
            "call_transcripts",
            "call_participants",
            "call_recordings",
            "call_rooms",
            "candidate_profiles",
            "users",
        ] {
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "DROP TABLE IF EXISTS staffing_platform.{table} CASCADE"
                ))
                .await?;
        }

        for enum_type in [
            "call_transcript_status",
            "call_participant_role",
            "call_participant_status",
            "call_recording_status",
            "call_room_status",
        ] {
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "DROP TYPE IF EXISTS staffing_platform.{enum_type}"
                ))
                .await?;
        }

        Ok(())
    }
}
