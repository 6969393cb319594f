//! CRUD operations for the call_transcripts table.

use super::error::{EntityApiErrorKind, Error};
use entity::call_transcript_status::CallTranscriptStatus;
use entity::call_transcripts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Creates a new transcript record in the queued state.
/// Content fields are filled in later by the transcription workflow.
pub async fn create_queued(
    db: &DatabaseConnection,
    call_recording_id: Id,
    call_room_id: Id,
) -> Result<Model, Error> {
    debug!("Creating queued transcript for recording {call_recording_id}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        call_recording_id: Set(call_recording_id),
        call_room_id: Set(call_room_id),
        status: Set(CallTranscriptStatus::Queued),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Marks a transcript completed with its content.
///
/// Terminal statuses are reached exactly once: completing an
/// already-completed or already-failed transcript is rejected.
pub async fn complete(
    db: &DatabaseConnection,
    id: Id,
    full_text: Option<String>,
    summary: Option<String>,
    key_points: Option<serde_json::Value>,
    word_count: Option<i32>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if existing.status.is_terminal() {
        debug!(
            "Refusing to complete transcript {id} already in terminal status {}",
            existing.status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotUpdated,
        });
    }

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        call_recording_id: Unchanged(existing.call_recording_id),
        call_room_id: Unchanged(existing.call_room_id),
        status: Set(CallTranscriptStatus::Completed),
        full_text: Set(full_text),
        summary: Set(summary),
        key_points: Set(key_points),
        word_count: Set(word_count),
        error_message: Set(None),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Marks a transcript failed with an error message, once.
pub async fn fail(
    db: &DatabaseConnection,
    id: Id,
    error_message: Option<String>,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    if existing.status.is_terminal() {
        debug!(
            "Refusing to fail transcript {id} already in terminal status {}",
            existing.status
        );
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotUpdated,
        });
    }

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        call_recording_id: Unchanged(existing.call_recording_id),
        call_room_id: Unchanged(existing.call_room_id),
        status: Set(CallTranscriptStatus::Failed),
        full_text: Unchanged(existing.full_text),
        summary: Unchanged(existing.summary),
        key_points: Unchanged(existing.key_points),
        word_count: Unchanged(existing.word_count),
        error_message: Set(error_message),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Moves a queued transcript into the processing state
pub async fn mark_processing(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        call_recording_id: Unchanged(existing.call_recording_id),
        call_room_id: Unchanged(existing.call_room_id),
        status: Set(CallTranscriptStatus::Processing),
        full_text: Unchanged(existing.full_text),
        summary: Unchanged(existing.summary),
        key_points: Unchanged(existing.key_points),
        word_count: Unchanged(existing.word_count),
        error_message: Unchanged(existing.error_message),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Finds a transcript by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Finds the transcript for a recording, if any
pub async fn find_by_call_recording_id(
    db: &DatabaseConnection,
    call_recording_id: Id,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CallRecordingId.eq(call_recording_id))
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await?)
}

/// Total number of transcripts
pub async fn count(db: &DatabaseConnection) -> Result<u64, Error> {
    Ok(Entity::find().count(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn a_transcript(status: CallTranscriptStatus) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            call_recording_id: Id::new_v4(),
            call_room_id: Id::new_v4(),
            status,
            full_text: None,
            summary: None,
            key_points: None,
            word_count: None,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_queued_returns_a_queued_transcript() -> Result<(), Error> {
        let transcript = a_transcript(CallTranscriptStatus::Queued);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![transcript.clone()]])
            .into_connection();

        let created =
            create_queued(&db, transcript.call_recording_id, transcript.call_room_id).await?;

        assert_eq!(created.status, CallTranscriptStatus::Queued);
        assert_eq!(created.full_text, None);
        Ok(())
    }

    #[tokio::test]
    async fn complete_rejects_an_already_terminal_transcript() {
        let transcript = a_transcript(CallTranscriptStatus::Completed);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![transcript.clone()]])
            .into_connection();

        let result = complete(
            &db,
            transcript.id,
            Some("text".to_string()),
            None,
            None,
            Some(1),
        )
        .await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotUpdated
        );
    }

    #[tokio::test]
    async fn fail_rejects_an_already_terminal_transcript() {
        let transcript = a_transcript(CallTranscriptStatus::Failed);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![transcript.clone()]])
            .into_connection();

        let result = fail(&db, transcript.id, Some("boom".to_string())).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotUpdated
        );
    }
}
