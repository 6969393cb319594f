//! CRUD operations for the call_participants table.

use super::error::{EntityApiErrorKind, Error};
use entity::call_participant_role::CallParticipantRole;
use entity::call_participant_status::CallParticipantStatus;
use entity::call_participants::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    Condition, DatabaseConnection, QueryOrder, TryIntoModel,
};

/// Creates a new call participant record
pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    debug!(
        "Creating call participant '{}' for room {}",
        model.display_name, model.call_room_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        call_room_id: Set(model.call_room_id),
        user_id: Set(model.user_id),
        display_name: Set(model.display_name),
        role: Set(model.role),
        status: Set(model.status),
        joined_at: Set(model.joined_at),
        left_at: Set(model.left_at),
        duration_seconds: Set(model.duration_seconds),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.save(db).await?.try_into_model()?)
}

/// Finds the participant row for a (room, user-or-name) key regardless of status.
///
/// Matching prefers the internal user id when the event carried one;
/// anonymous participants are matched by display name. Two anonymous
/// participants sharing a display name therefore collapse into one row --
/// a known ambiguity of name-keyed matching.
pub async fn find_by_room_and_identity(
    db: &DatabaseConnection,
    call_room_id: Id,
    user_id: Option<Id>,
    display_name: &str,
) -> Result<Option<Model>, Error> {
    let identity = match user_id {
        Some(user_id) => Condition::all().add(Column::UserId.eq(user_id)),
        None => Condition::all().add(Column::DisplayName.eq(display_name)),
    };

    Ok(Entity::find()
        .filter(Column::CallRoomId.eq(call_room_id))
        .filter(identity)
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await?)
}

/// Finds the currently-joined participant row for a (room, user-or-name) key
pub async fn find_joined_by_room_and_identity(
    db: &DatabaseConnection,
    call_room_id: Id,
    user_id: Option<Id>,
    display_name: &str,
) -> Result<Option<Model>, Error> {
    let identity = match user_id {
        Some(user_id) => Condition::all().add(Column::UserId.eq(user_id)),
        None => Condition::all().add(Column::DisplayName.eq(display_name)),
    };

    Ok(Entity::find()
        .filter(Column::CallRoomId.eq(call_room_id))
        .filter(Column::Status.eq(CallParticipantStatus::Joined))
        .filter(identity)
        .one(db)
        .await?)
}

/// Re-marks an existing participant row as joined, refreshing name and role
pub async fn mark_joined(
    db: &DatabaseConnection,
    existing: Model,
    display_name: String,
    role: CallParticipantRole,
    joined_at: DateTimeWithTimeZone,
) -> Result<Model, Error> {
    debug!("Re-joining call participant: {}", existing.id);

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        call_room_id: Unchanged(existing.call_room_id),
        user_id: Unchanged(existing.user_id),
        display_name: Set(display_name),
        role: Set(role),
        status: Set(CallParticipantStatus::Joined),
        joined_at: Set(Some(joined_at)),
        left_at: Set(None),
        duration_seconds: Set(None),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// Closes a joined participant row, computing the time spent in the call
pub async fn mark_left(
    db: &DatabaseConnection,
    existing: Model,
    left_at: DateTimeWithTimeZone,
) -> Result<Model, Error> {
    debug!("Closing call participant: {}", existing.id);

    let duration_seconds = existing
        .joined_at
        .map(|joined_at| (left_at - joined_at).num_seconds() as i32);

    let active_model = ActiveModel {
        id: Unchanged(existing.id),
        call_room_id: Unchanged(existing.call_room_id),
        user_id: Unchanged(existing.user_id),
        display_name: Unchanged(existing.display_name),
        role: Unchanged(existing.role),
        status: Set(CallParticipantStatus::Left),
        joined_at: Unchanged(existing.joined_at),
        left_at: Set(Some(left_at)),
        duration_seconds: Set(duration_seconds),
        created_at: Unchanged(existing.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?.try_into_model()?)
}

/// All participants for a room
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

/// Number of participant rows recorded for a room
pub async fn count_for_room(db: &DatabaseConnection, call_room_id: Id) -> Result<u64, Error> {
    Ok(Entity::find()
        .filter(Column::CallRoomId.eq(call_room_id))
        .count(db)
        .await?)
}

/// Total number of call participants
pub async fn count(db: &DatabaseConnection) -> Result<u64, Error> {
    Ok(Entity::find().count(db).await?)
}

/// Finds a call participant by ID
pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| Error {
        source: None,
        error_kind: EntityApiErrorKind::RecordNotFound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn a_participant(joined_at: DateTimeWithTimeZone) -> Model {
        let now = chrono::Utc::now();
        Model {
            id: Id::new_v4(),
            call_room_id: Id::new_v4(),
            user_id: None,
            display_name: "Jane Doe".to_string(),
            role: CallParticipantRole::Candidate,
            status: CallParticipantStatus::Joined,
            joined_at: Some(joined_at),
            left_at: None,
            duration_seconds: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_a_new_call_participant_model() -> Result<(), Error> {
        let participant = a_participant(chrono::Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![participant.clone()]])
            .into_connection();

        let created = create(&db, participant.clone()).await?;

        assert_eq!(created.display_name, "Jane Doe");
        assert_eq!(created.status, CallParticipantStatus::Joined);
        Ok(())
    }

    #[tokio::test]
    async fn mark_left_computes_duration_from_joined_at() -> Result<(), Error> {
        let joined_at: DateTimeWithTimeZone = chrono::Utc::now().into();
        let left_at = joined_at + chrono::Duration::seconds(754);

        let participant = a_participant(joined_at);

        let mut closed = participant.clone();
        closed.status = CallParticipantStatus::Left;
        closed.left_at = Some(left_at);
        closed.duration_seconds = Some(754);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![closed.clone()]])
            .into_connection();

        let result = mark_left(&db, participant, left_at).await?;

        assert_eq!(result.status, CallParticipantStatus::Left);
        assert_eq!(result.duration_seconds, Some(754));
        Ok(())
    }

    #[tokio::test]
    async fn find_joined_by_room_and_identity_returns_none_when_absent() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<Model>::new()])
            .into_connection();

        let found =
            find_joined_by_room_and_identity(&db, Id::new_v4(), None, "Nobody Here").await?;

        assert_eq!(found, None);
        Ok(())
    }
}
