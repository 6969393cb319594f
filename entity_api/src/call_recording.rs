//! CRUD operations for the call_recordings table.
//!
//! Writes attempt the full column set first. Schemas from before the storage
//! migration columns were added reject those writes with an undefined-column
//! error, in which case the write retries with only guaranteed-safe columns.

use super::error::{EntityApiErrorKind, Error};
use entity::call_recording_status::CallRecordingStatus;
use entity::call_recordings::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{NotSet, Set, Unchanged},
    DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Creates a new call recording record.
///
/// Falls back to a minimal insert (without storage provider and URL expiry
/// columns) when the rich insert hits an undefined-column error.
pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!(
        "Creating call recording {} for room {}",
        model.daily_recording_id, model.call_room_id
    );

    let now = chrono::Utc::now();

    let rich = ActiveModel {
        call_room_id: Set(model.call_room_id),
        daily_recording_id: Set(model.daily_recording_id.clone()),
        status: Set(model.status.clone()),
        storage_provider: Set(model.storage_provider.clone()),
        storage_key: Set(model.storage_key.clone()),
        duration_seconds: Set(model.duration_seconds),
        download_url: Set(model.download_url.clone()),
        url_expires_at: Set(model.url_expires_at),
        error_message: Set(model.error_message.clone()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    match rich.save(db).await {
        Ok(saved) => Ok(saved.try_into_model()?),
        Err(err) => {
            let api_err: Error = err.into();
            if !api_err.is_undefined_column() {
                return Err(api_err);
            }
            warn!(
                "Rich call_recordings insert failed with undefined column, \
                 retrying with minimal column set"
            );
            let minimal = ActiveModel {
                call_room_id: Set(model.call_room_id),
                daily_recording_id: Set(model.daily_recording_id),
                status: Set(model.status),
                storage_provider: NotSet,
                storage_key: Set(model.storage_key),
                duration_seconds: Set(model.duration_seconds),
                download_url: Set(model.download_url),
                url_expires_at: NotSet,
                error_message: Set(model.error_message),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            Ok(minimal.save(db).await?.try_into_model()?)
        }
    }
}

/// Updates an existing call recording record.
///
/// Like `create`, retries without the storage provider and URL expiry
/// columns when the rich update hits an undefined-column error.
pub async fn update(db: &DatabaseConnection, id: Id, model: Model) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            debug!("Updating call recording: {id}");

            let now = chrono::Utc::now();

            let rich = ActiveModel {
                id: Unchanged(existing.id),
                call_room_id: Unchanged(existing.call_room_id),
                daily_recording_id: Unchanged(existing.daily_recording_id.clone()),
                status: Set(model.status.clone()),
                storage_provider: Set(model.storage_provider.clone()),
                storage_key: Set(model.storage_key.clone()),
                duration_seconds: Set(model.duration_seconds),
                download_url: Set(model.download_url.clone()),
                url_expires_at: Set(model.url_expires_at),
                error_message: Set(model.error_message.clone()),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(now.into()),
            };

            match rich.update(db).await {
                Ok(updated) => Ok(updated.try_into_model()?),
                Err(err) => {
                    let api_err: Error = err.into();
                    if !api_err.is_undefined_column() {
                        return Err(api_err);
                    }
                    warn!(
                        "Rich call_recordings update failed with undefined column, \
                         retrying with minimal column set"
                    );
                    let minimal = ActiveModel {
                        id: Unchanged(existing.id),
                        call_room_id: Unchanged(existing.call_room_id),
                        daily_recording_id: Unchanged(existing.daily_recording_id),
                        status: Set(model.status),
                        storage_provider: NotSet,
                        storage_key: Set(model.storage_key),
                        duration_seconds: Set(model.duration_seconds),
                        download_url: Set(model.download_url),
                        url_expires_at: NotSet,
                        error_message: Set(model.error_message),
                        created_at: Unchanged(existing.created_at),
                        updated_at: Set(now.into()),
                    };
                    Ok(minimal.update(db).await?.try_into_model()?)
                }
            }
        }
        None => {
            debug!("Call recording with id {id} not found");
            Err(Error {
                source: None,
                error_kind: EntityApiErrorKind::RecordNotFound,
            })
        }
    }
}

/// Updates just the status of a call recording
pub async fn update_status(
    db: &DatabaseConnection,
    id: Id,
    status: CallRecordingStatus,
    error_message: Option<String>,
) -> Result<Model, Error> {
    let result = Entity::find_by_id(id).one(db).await?;

    match result {
        Some(existing) => {
            debug!("Updating call recording status to {status}: {id}");

            let active_model = ActiveModel {
                id: Unchanged(existing.id),
                call_room_id: Unchanged(existing.call_room_id),
                daily_recording_id: Unchanged(existing.daily_recording_id),
                status: Set(status),
                storage_provider: Unchanged(existing.storage_provider),
                storage_key: Unchanged(existing.storage_key),
                duration_seconds: Unchanged(existing.duration_seconds),
                download_url: Unchanged(existing.download_url),
                url_expires_at: Unchanged(existing.url_expires_at),
                error_message: Set(error_message),
                created_at: Unchanged(existing.created_at),
                updated_at: Set(chrono::Utc::now().into()),
            };

            Ok(active_model.update(db).await?.try_into_model()?)
        }
        None => Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }),
    }
}

/// Finds a call recording by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

/// Finds a call recording by the provider's recording id.
/// This is the idempotency lookup for webhook deliveries.
pub async fn find_by_daily_recording_id(
    db: &DatabaseConnection,
    daily_recording_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::DailyRecordingId.eq(daily_recording_id))
        .one(db)
        .await?)
}

/// All recordings for a room, newest first
pub async fn find_by_call_room_id(
    db: &DatabaseConnection,
    call_room_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CallRoomId.eq(call_room_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Total number of call recordings
pub async fn count(db: &DatabaseConnection) -> Result<u64, Error> {
    Ok(Entity::find().count(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, RuntimeErr};

    fn a_recording() -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            call_room_id: Id::new_v4(),
            daily_recording_id: "rec-9".to_string(),
            status: CallRecordingStatus::Processing,
            storage_provider: Some("daily".to_string()),
            storage_key: None,
            duration_seconds: Some(125),
            download_url: None,
            url_expires_at: None,
            error_message: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_call_recording_model() -> Result<(), Error> {
        let recording = a_recording();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![recording.clone()]])
            .into_connection();

        let created = create(&db, recording.clone()).await?;

        assert_eq!(created.daily_recording_id, recording.daily_recording_id);
        assert_eq!(created.status, CallRecordingStatus::Processing);
        Ok(())
    }

    #[tokio::test]
    async fn create_retries_with_minimal_columns_on_undefined_column() -> Result<(), Error> {
        let recording = a_recording();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Query(RuntimeErr::Internal(
                "column \"url_expires_at\" of relation \"call_recordings\" does not exist"
                    .to_string(),
            ))])
            .append_query_results(vec![vec![recording.clone()]])
            .into_connection();

        let created = create(&db, recording.clone()).await?;

        assert_eq!(created.daily_recording_id, recording.daily_recording_id);
        Ok(())
    }

    #[tokio::test]
    async fn update_retries_with_minimal_columns_on_undefined_column() -> Result<(), Error> {
        let existing = a_recording();
        let mut ready = existing.clone();
        ready.status = CallRecordingStatus::Ready;
        ready.download_url = Some("https://media.example.com/rec-9".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing.clone()]])
            .append_query_errors(vec![DbErr::Query(RuntimeErr::Internal(
                "column \"storage_provider\" of relation \"call_recordings\" does not exist"
                    .to_string(),
            ))])
            .append_query_results(vec![vec![ready.clone()]])
            .into_connection();

        let updated = update(&db, existing.id, ready.clone()).await?;

        assert_eq!(updated.status, CallRecordingStatus::Ready);
        assert_eq!(updated.download_url, ready.download_url);
        Ok(())
    }

    #[tokio::test]
    async fn find_by_daily_recording_id_returns_none_when_absent() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let found = find_by_daily_recording_id(&db, "rec-404").await?;

        assert_eq!(found, None);
        Ok(())
    }

    #[tokio::test]
    async fn update_status_replaces_status_and_error_message() -> Result<(), Error> {
        let existing = a_recording();
        let mut failed = existing.clone();
        failed.status = CallRecordingStatus::Failed;
        failed.error_message = Some("provider error".to_string());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing.clone()], vec![failed.clone()]])
            .into_connection();

        let updated = update_status(
            &db,
            existing.id,
            CallRecordingStatus::Failed,
            Some("provider error".to_string()),
        )
        .await?;

        assert_eq!(updated.status, CallRecordingStatus::Failed);
        assert_eq!(updated.error_message, Some("provider error".to_string()));
        Ok(())
    }
}
