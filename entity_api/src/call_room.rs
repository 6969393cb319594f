//! CRUD operations for the call_rooms table.
//!
//! Room lookups carry a schema-compatibility fallback: deployments running a
//! schema from before the job/application/agency linkage migration reject the
//! rich projection with an undefined-column error, so the lookup retries with
//! only the guaranteed base columns.

use super::error::{db_err_is_undefined_column, EntityApiErrorKind, Error};
use entity::call_room_status::CallRoomStatus;
use entity::call_rooms::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    DatabaseConnection, FromQueryResult, QueryOrder, QuerySelect, TryIntoModel,
};

/// Projection of call_rooms limited to columns present in every deployed
/// schema version. Linkage columns were added later and are filled with None.
#[derive(Debug, FromQueryResult)]
struct MinimalModel {
    id: Id,
    daily_room_name: String,
    host_user_id: Id,
    candidate_user_id: Option<Id>,
    status: CallRoomStatus,
    transcription_enabled: bool,
    started_at: Option<DateTimeWithTimeZone>,
    ended_at: Option<DateTimeWithTimeZone>,
    duration_seconds: Option<i32>,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
}

impl From<MinimalModel> for Model {
    fn from(minimal: MinimalModel) -> Self {
        Model {
            id: minimal.id,
            daily_room_name: minimal.daily_room_name,
            host_user_id: minimal.host_user_id,
            candidate_user_id: minimal.candidate_user_id,
            status: minimal.status,
            transcription_enabled: minimal.transcription_enabled,
            started_at: minimal.started_at,
            ended_at: minimal.ended_at,
            duration_seconds: minimal.duration_seconds,
            job_id: None,
            application_id: None,
            agency_id: None,
            created_at: minimal.created_at,
            updated_at: minimal.updated_at,
        }
    }
}

/// Finds a call room by the provider's room name.
///
/// Attempts the rich query first and retries with the minimal column set
/// only when the failure is specifically an undefined-column error. Other
/// failures propagate untouched so real problems are not masked.
pub async fn find_by_daily_room_name(
    db: &DatabaseConnection,
    daily_room_name: &str,
) -> Result<Option<Model>, Error> {
    match Entity::find()
        .filter(Column::DailyRoomName.eq(daily_room_name))
        .one(db)
        .await
    {
        Ok(room) => Ok(room),
        Err(err) if db_err_is_undefined_column(&err) => {
            warn!(
                "Rich call_rooms query failed with undefined column, \
                 retrying with minimal column set: {err:?}"
            );
            find_one_minimal(db, Column::DailyRoomName.eq(daily_room_name)).await
        }
        Err(err) => Err(err.into()),
    }
}

/// Finds a call room by ID, with the same minimal-column retry as the
/// by-name lookup.
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let room = match Entity::find_by_id(id).one(db).await {
        Ok(room) => room,
        Err(err) if db_err_is_undefined_column(&err) => {
            warn!(
                "Rich call_rooms lookup failed with undefined column, \
                 retrying with minimal column set: {err:?}"
            );
            find_one_minimal(db, Column::Id.eq(id)).await?
        }
        Err(err) => return Err(err.into()),
    };

    room.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

async fn find_one_minimal(
    db: &DatabaseConnection,
    filter: sea_orm::sea_query::SimpleExpr,
) -> Result<Option<Model>, Error> {
    let row = Entity::find()
        .select_only()
        .column(Column::Id)
        .column(Column::DailyRoomName)
        .column(Column::HostUserId)
        .column(Column::CandidateUserId)
        .column(Column::Status)
        .column(Column::TranscriptionEnabled)
        .column(Column::StartedAt)
        .column(Column::EndedAt)
        .column(Column::DurationSeconds)
        .column(Column::CreatedAt)
        .column(Column::UpdatedAt)
        .filter(filter)
        .into_model::<MinimalModel>()
        .one(db)
        .await?;

    Ok(row.map(Model::from))
}

/// Most recently created rooms, newest first. Used for diagnostics when a
/// webhook references a room we cannot find.
pub async fn find_recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

/// Marks a room active with the given start timestamp
pub async fn mark_active(
    db: &DatabaseConnection,
    existing: Model,
    started_at: DateTimeWithTimeZone,
) -> Result<Model, Error> {
    debug!("Marking call room {} active", existing.id);

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        status: Set(CallRoomStatus::Active),
        started_at: Set(Some(started_at)),
        updated_at: Set(chrono::Utc::now().into()),
        ..unchanged_fields(&existing)
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Marks a room ended, recording the end timestamp and total duration
pub async fn mark_ended(
    db: &DatabaseConnection,
    existing: Model,
    ended_at: DateTimeWithTimeZone,
    duration_seconds: Option<i32>,
) -> Result<Model, Error> {
    debug!("Marking call room {} ended", existing.id);

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        status: Set(CallRoomStatus::Ended),
        ended_at: Set(Some(ended_at)),
        duration_seconds: Set(duration_seconds),
        updated_at: Set(chrono::Utc::now().into()),
        ..unchanged_fields(&existing)
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Total number of call rooms
pub async fn count(db: &DatabaseConnection) -> Result<u64, Error> {
    Ok(Entity::find().count(db).await?)
}

fn unchanged_fields(existing: &Model) -> ActiveModel {
    ActiveModel {
        id: Unchanged(existing.id),
        daily_room_name: Unchanged(existing.daily_room_name.clone()),
        host_user_id: Unchanged(existing.host_user_id),
        candidate_user_id: Unchanged(existing.candidate_user_id),
        status: Unchanged(existing.status.clone()),
        transcription_enabled: Unchanged(existing.transcription_enabled),
        started_at: Unchanged(existing.started_at),
        ended_at: Unchanged(existing.ended_at),
        duration_seconds: Unchanged(existing.duration_seconds),
        job_id: Unchanged(existing.job_id),
        application_id: Unchanged(existing.application_id),
        agency_id: Unchanged(existing.agency_id),
        created_at: Unchanged(existing.created_at),
        updated_at: Unchanged(existing.updated_at),
    }
}
