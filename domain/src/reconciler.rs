//! Webhook event reconciliation.
//!
//! Takes one canonical event and folds it into call room, recording,
//! participant, and transcript state. Reconciliation is deliberately split
//! from side effects: `reconcile` only touches the database and returns the
//! follow-up work, which the web layer runs through `dispatch_follow_ups`
//! after the delivery has been acknowledged. Provider deliveries are
//! at-least-once, so every handler is idempotent.

use crate::call_participant::{self, UNKNOWN_DISPLAY_NAME};
use crate::call_participant_role::CallParticipantRole;
use crate::call_participant_status::CallParticipantStatus;
use crate::call_participants;
use crate::call_recording_status::CallRecordingStatus;
use crate::call_recordings;
use crate::call_room;
use crate::call_room_status::CallRoomStatus;
use crate::call_rooms;
use crate::error::Error;
use crate::gateway::{daily, notification, storage, transcription};
use crate::webhook_event::{CanonicalEvent, EventKind, ParticipantInfo};
use crate::Id;
use entity_api::{call_recording, call_transcript};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;

/// What reconciliation did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// State was updated.
    Applied,
    /// A redelivery or out-of-order repeat; state was left untouched.
    Duplicate,
    /// The event was recognized but could not be applied (missing fields,
    /// unknown room, unpaired leave). Logged and discarded.
    Dropped,
    /// An event kind we do not handle.
    Ignored,
}

/// Side-effect work owed after an event has been acknowledged.
#[derive(Debug, Clone)]
pub enum FollowUp {
    /// A recording just became ready: migrate its media, kick off
    /// transcription, and notify any linked agency.
    FinalizeRecording {
        room: call_rooms::Model,
        recording: call_recordings::Model,
    },
}

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub disposition: Disposition,
    pub follow_ups: Vec<FollowUp>,
}

impl ReconcileOutcome {
    fn applied() -> Self {
        Self {
            disposition: Disposition::Applied,
            follow_ups: Vec::new(),
        }
    }

    fn applied_with(follow_up: FollowUp) -> Self {
        Self {
            disposition: Disposition::Applied,
            follow_ups: vec![follow_up],
        }
    }

    fn duplicate() -> Self {
        Self {
            disposition: Disposition::Duplicate,
            follow_ups: Vec::new(),
        }
    }

    fn dropped() -> Self {
        Self {
            disposition: Disposition::Dropped,
            follow_ups: Vec::new(),
        }
    }

    fn ignored() -> Self {
        Self {
            disposition: Disposition::Ignored,
            follow_ups: Vec::new(),
        }
    }
}

/// Applies one canonical event to persistent state.
pub async fn reconcile(
    db: &DatabaseConnection,
    config: &Config,
    event: &CanonicalEvent,
) -> Result<ReconcileOutcome, Error> {
    match &event.kind {
        EventKind::RecordingStarted => handle_recording_started(db, event).await,
        EventKind::RecordingReady => handle_recording_ready(db, config, event).await,
        EventKind::RecordingError => handle_recording_error(db, event).await,
        EventKind::MeetingStarted => {
            // The room goes active when the first participant actually
            // joins, not when the provider spins the meeting up, so this
            // event is log-only.
            info!(
                "Meeting started in room '{}'",
                event.daily_room_name.as_deref().unwrap_or("<unnamed>")
            );
            Ok(ReconcileOutcome::applied())
        }
        EventKind::MeetingEnded => handle_meeting_ended(db, event).await,
        EventKind::ParticipantJoined => handle_participant_joined(db, event).await,
        EventKind::ParticipantLeft => handle_participant_left(db, event).await,
        EventKind::Unhandled(tag) => {
            info!("Ignoring unhandled webhook event kind '{tag}'");
            Ok(ReconcileOutcome::ignored())
        }
    }
}

async fn handle_recording_started(
    db: &DatabaseConnection,
    event: &CanonicalEvent,
) -> Result<ReconcileOutcome, Error> {
    let Some(daily_recording_id) = event.daily_recording_id.as_deref() else {
        warn!("recording.started event carried no recording id, dropping");
        return Ok(ReconcileOutcome::dropped());
    };

    if let Some(existing) = call_recording::find_by_daily_recording_id(db, daily_recording_id).await?
    {
        debug!(
            "Recording {daily_recording_id} already tracked as {}, treating started event as a redelivery",
            existing.id
        );
        return Ok(ReconcileOutcome::duplicate());
    }

    let Some(daily_room_name) = event.daily_room_name.as_deref() else {
        warn!("recording.started event for {daily_recording_id} carried no room name, dropping");
        return Ok(ReconcileOutcome::dropped());
    };

    let Some(room) = call_room::resolve_by_daily_room_name(db, daily_room_name).await? else {
        return Ok(ReconcileOutcome::dropped());
    };

    let created = call_recording::create(
        db,
        new_recording(
            room.id,
            daily_recording_id,
            CallRecordingStatus::Processing,
            event.duration_seconds,
            event.storage_key.clone(),
            None,
            None,
        ),
    )
    .await?;

    info!(
        "Recording {daily_recording_id} started in room {}, tracked as {}",
        room.id, created.id
    );
    Ok(ReconcileOutcome::applied())
}

async fn handle_recording_ready(
    db: &DatabaseConnection,
    config: &Config,
    event: &CanonicalEvent,
) -> Result<ReconcileOutcome, Error> {
    let Some(daily_recording_id) = event.daily_recording_id.as_deref() else {
        warn!("recording.ready event carried no recording id, dropping");
        return Ok(ReconcileOutcome::dropped());
    };

    let existing = call_recording::find_by_daily_recording_id(db, daily_recording_id).await?;

    if let Some(existing) = &existing {
        if existing.status == CallRecordingStatus::Ready {
            debug!("Recording {daily_recording_id} is already ready, treating as a redelivery");
            return Ok(ReconcileOutcome::duplicate());
        }
    }

    let access_link = fetch_access_link(config, daily_recording_id).await?;
    let download_url = access_link.as_ref().map(|link| link.download_link.clone());
    let url_expires_at = access_link.as_ref().and_then(expiry_timestamp);

    match existing {
        Some(existing) => {
            let room = call_room::find_by_id(db, existing.call_room_id).await?;

            let mut updated = existing.clone();
            updated.status = CallRecordingStatus::Ready;
            updated.duration_seconds = event.duration_seconds.or(existing.duration_seconds);
            updated.storage_key = event.storage_key.clone().or(existing.storage_key);
            updated.download_url = download_url.or(existing.download_url);
            updated.url_expires_at = url_expires_at.or(existing.url_expires_at);
            updated.error_message = None;
            let updated = call_recording::update(db, existing.id, updated).await?;

            info!("Recording {daily_recording_id} is ready");
            Ok(ReconcileOutcome::applied_with(FollowUp::FinalizeRecording {
                room,
                recording: updated,
            }))
        }
        None => {
            // The started event can be lost or arrive out of order, so ready
            // also creates the row when it is first to land.
            let Some(daily_room_name) = event.daily_room_name.as_deref() else {
                warn!(
                    "recording.ready event for untracked recording {daily_recording_id} \
                     carried no room name, dropping"
                );
                return Ok(ReconcileOutcome::dropped());
            };

            let Some(room) = call_room::resolve_by_daily_room_name(db, daily_room_name).await?
            else {
                return Ok(ReconcileOutcome::dropped());
            };

            let created = call_recording::create(
                db,
                new_recording(
                    room.id,
                    daily_recording_id,
                    CallRecordingStatus::Ready,
                    event.duration_seconds,
                    event.storage_key.clone(),
                    download_url,
                    url_expires_at,
                ),
            )
            .await?;

            info!("Recording {daily_recording_id} is ready (no started event was seen)");
            Ok(ReconcileOutcome::applied_with(FollowUp::FinalizeRecording {
                room,
                recording: created,
            }))
        }
    }
}

async fn handle_recording_error(
    db: &DatabaseConnection,
    event: &CanonicalEvent,
) -> Result<ReconcileOutcome, Error> {
    let Some(daily_recording_id) = event.daily_recording_id.as_deref() else {
        warn!("recording.error event carried no recording id, dropping");
        return Ok(ReconcileOutcome::dropped());
    };

    let Some(existing) = call_recording::find_by_daily_recording_id(db, daily_recording_id).await?
    else {
        warn!("recording.error event for untracked recording {daily_recording_id}, dropping");
        return Ok(ReconcileOutcome::dropped());
    };

    if existing.status.is_terminal() {
        debug!(
            "Recording {daily_recording_id} is already {}, treating error event as a redelivery",
            existing.status
        );
        return Ok(ReconcileOutcome::duplicate());
    }

    let error_message = event
        .error_detail
        .clone()
        .unwrap_or_else(|| "unspecified provider error".to_string());

    call_recording::update_status(
        db,
        existing.id,
        CallRecordingStatus::Failed,
        Some(error_message),
    )
    .await?;

    warn!("Recording {daily_recording_id} failed at the provider");
    Ok(ReconcileOutcome::applied())
}

async fn handle_meeting_ended(
    db: &DatabaseConnection,
    event: &CanonicalEvent,
) -> Result<ReconcileOutcome, Error> {
    let Some(room) = require_room(db, event).await? else {
        return Ok(ReconcileOutcome::dropped());
    };

    if room.status == CallRoomStatus::Ended {
        debug!("Call room {} has already ended, treating as a redelivery", room.id);
        return Ok(ReconcileOutcome::duplicate());
    }

    let ended_at: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();
    let duration_seconds = event.duration_seconds.or_else(|| {
        room.started_at
            .map(|started_at| (ended_at - started_at).num_seconds() as i32)
    });

    let ended = call_room::mark_ended(db, room, ended_at, duration_seconds).await?;

    // Join/leave events can be lost entirely. When the call ends without a
    // single participant row, the known host and candidate are synthesized
    // so attendance reporting still has something to show.
    if call_participant::count_for_room(db, ended.id).await? == 0 {
        synthesize_participants(db, &ended, ended_at).await?;
    }

    info!("Call room {} ended", ended.id);
    Ok(ReconcileOutcome::applied())
}

async fn synthesize_participants(
    db: &DatabaseConnection,
    room: &call_rooms::Model,
    ended_at: chrono::DateTime<chrono::FixedOffset>,
) -> Result<(), Error> {
    info!(
        "Call room {} ended with no participant records, synthesizing from room identities",
        room.id
    );

    for mut row in synthesized_attendance(room, ended_at) {
        row.display_name = call_participant::resolve_display_name(db, row.user_id, None).await;
        call_participant::create(db, row).await?;
    }

    Ok(())
}

/// Attendance rows for the room's known identities: the host, plus the
/// candidate when the room has one. Each row spans the room's started/ended
/// window in the `Left` status. Display names are resolved separately.
fn synthesized_attendance(
    room: &call_rooms::Model,
    ended_at: chrono::DateTime<chrono::FixedOffset>,
) -> Vec<call_participants::Model> {
    let duration_seconds = room
        .started_at
        .map(|started_at| (ended_at - started_at).num_seconds() as i32);

    let mut identities = vec![(room.host_user_id, CallParticipantRole::Host)];
    if let Some(candidate_user_id) = room.candidate_user_id {
        identities.push((candidate_user_id, CallParticipantRole::Candidate));
    }

    identities
        .into_iter()
        .map(|(user_id, role)| call_participants::Model {
            id: Id::new_v4(),
            call_room_id: room.id,
            user_id: Some(user_id),
            display_name: UNKNOWN_DISPLAY_NAME.to_string(),
            role,
            status: CallParticipantStatus::Left,
            joined_at: room.started_at,
            left_at: Some(ended_at),
            duration_seconds,
            created_at: ended_at,
            updated_at: ended_at,
        })
        .collect()
}

async fn handle_participant_joined(
    db: &DatabaseConnection,
    event: &CanonicalEvent,
) -> Result<ReconcileOutcome, Error> {
    let Some(room) = require_room(db, event).await? else {
        return Ok(ReconcileOutcome::dropped());
    };

    let Some(participant) = event.participant.as_ref() else {
        warn!(
            "participant.joined for call room {} carried no participant details, dropping",
            room.id
        );
        return Ok(ReconcileOutcome::dropped());
    };

    let user_id = internal_user_id(participant);
    let display_name =
        call_participant::resolve_display_name(db, user_id, participant.display_name.as_deref())
            .await;
    let role = call_participant::role_for(&room, user_id);
    let joined_at: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();

    // The first join is what actually starts the call.
    let room = match room.status {
        CallRoomStatus::Created | CallRoomStatus::Waiting => {
            call_room::mark_active(db, room, joined_at).await?
        }
        _ => room,
    };

    match call_participant::find_by_room_and_identity(db, room.id, user_id, &display_name).await? {
        Some(existing) => {
            // A rejoin after a drop reopens the same row.
            call_participant::mark_joined(db, existing, display_name, role, joined_at).await?;
        }
        None => {
            call_participant::create(
                db,
                call_participants::Model {
                    id: Id::new_v4(),
                    call_room_id: room.id,
                    user_id,
                    display_name,
                    role,
                    status: CallParticipantStatus::Joined,
                    joined_at: Some(joined_at),
                    left_at: None,
                    duration_seconds: None,
                    created_at: joined_at,
                    updated_at: joined_at,
                },
            )
            .await?;
        }
    }

    Ok(ReconcileOutcome::applied())
}

async fn handle_participant_left(
    db: &DatabaseConnection,
    event: &CanonicalEvent,
) -> Result<ReconcileOutcome, Error> {
    let Some(room) = require_room(db, event).await? else {
        return Ok(ReconcileOutcome::dropped());
    };

    let Some(participant) = event.participant.as_ref() else {
        warn!(
            "participant.left for call room {} carried no participant details, dropping",
            room.id
        );
        return Ok(ReconcileOutcome::dropped());
    };

    let user_id = internal_user_id(participant);
    let display_name = participant
        .display_name
        .clone()
        .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string());

    let Some(existing) =
        call_participant::find_joined_by_room_and_identity(db, room.id, user_id, &display_name)
            .await?
    else {
        warn!(
            "participant.left for call room {} matches no joined participant, dropping",
            room.id
        );
        return Ok(ReconcileOutcome::dropped());
    };

    call_participant::mark_left(db, existing, chrono::Utc::now().into()).await?;
    Ok(ReconcileOutcome::applied())
}

/// Resolves the event's room name to a call room, dropping events that carry
/// no room name at all.
async fn require_room(
    db: &DatabaseConnection,
    event: &CanonicalEvent,
) -> Result<Option<call_rooms::Model>, Error> {
    let Some(daily_room_name) = event.daily_room_name.as_deref() else {
        warn!("{} event carried no room name, dropping", event.kind);
        return Ok(None);
    };

    call_room::resolve_by_daily_room_name(db, daily_room_name).await
}

/// The provider echoes back the user id we minted into the meeting token.
/// Anonymous joiners carry either no id or a provider-generated one that is
/// not a UUID; both are treated as anonymous.
fn internal_user_id(participant: &ParticipantInfo) -> Option<Id> {
    participant
        .external_user_id
        .as_deref()
        .and_then(|raw| Id::parse_str(raw).ok())
}

async fn fetch_access_link(
    config: &Config,
    daily_recording_id: &str,
) -> Result<Option<daily::AccessLink>, Error> {
    let Some(client) = daily::DailyClient::from_config(config)? else {
        debug!("No Daily API key configured, marking recording ready without a download URL");
        return Ok(None);
    };

    match client.fetch_access_link(daily_recording_id).await {
        Ok(link) => Ok(Some(link)),
        Err(e) => {
            // A missing link degrades the recording, it does not block it.
            warn!("Failed to fetch access link for recording {daily_recording_id}: {e:?}");
            Ok(None)
        }
    }
}

fn expiry_timestamp(link: &daily::AccessLink) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    link.expires
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(Into::into)
}

fn new_recording(
    call_room_id: Id,
    daily_recording_id: &str,
    status: CallRecordingStatus,
    duration_seconds: Option<i32>,
    storage_key: Option<String>,
    download_url: Option<String>,
    url_expires_at: Option<chrono::DateTime<chrono::FixedOffset>>,
) -> call_recordings::Model {
    let now: chrono::DateTime<chrono::FixedOffset> = chrono::Utc::now().into();
    call_recordings::Model {
        id: Id::new_v4(),
        call_room_id,
        daily_recording_id: daily_recording_id.to_string(),
        status,
        storage_provider: Some("daily".to_string()),
        storage_key,
        duration_seconds,
        download_url,
        url_expires_at,
        error_message: None,
        created_at: now,
        updated_at: now,
    }
}

/// Runs the post-acknowledgment work for a batch of follow-ups.
///
/// Every step is best effort: a failure is logged and the remaining steps
/// still run, since none of them can affect the already-sent acknowledgment.
pub async fn dispatch_follow_ups(
    db: &DatabaseConnection,
    config: &Config,
    follow_ups: Vec<FollowUp>,
) {
    for follow_up in follow_ups {
        match follow_up {
            FollowUp::FinalizeRecording { room, recording } => {
                finalize_recording(db, config, room, recording).await;
            }
        }
    }
}

async fn finalize_recording(
    db: &DatabaseConnection,
    config: &Config,
    room: call_rooms::Model,
    recording: call_recordings::Model,
) {
    let mut recording = recording;
    let mut permanent_url: Option<String> = None;

    if let Some(source_url) = recording.download_url.clone() {
        match storage::migrate_recording(config, &recording.daily_recording_id, &source_url).await
        {
            Ok(Some(migrated)) => {
                let mut updated = recording.clone();
                updated.storage_provider = Some("permanent".to_string());
                updated.storage_key = Some(migrated.storage_key.clone());
                updated.download_url = Some(migrated.public_url.clone());
                updated.url_expires_at = None;

                match call_recording::update(db, recording.id, updated).await {
                    Ok(saved) => {
                        permanent_url = Some(migrated.public_url);
                        recording = saved;
                    }
                    Err(e) => warn!(
                        "Failed to persist migrated storage location for recording {}: {e:?}",
                        recording.id
                    ),
                }
            }
            Ok(None) => {}
            Err(e) => warn!(
                "Storage migration failed for recording {}, keeping temporary URL: {e:?}",
                recording.id
            ),
        }
    }

    if room.transcription_enabled {
        kick_off_transcription(db, config, &room, &recording, permanent_url.as_deref()).await;
    }

    // Outward notification only applies to rooms linked to an application
    // through an agency.
    if let (Some(application_id), Some(agency_id)) = (room.application_id, room.agency_id) {
        let payload = notification::RecordingReadyNotification::new(
            room.id,
            application_id,
            agency_id,
            room.job_id,
            recording.id,
            recording.download_url.clone(),
        );
        if let Err(e) = notification::notify_recording_ready(config, &payload).await {
            warn!(
                "Agency notification failed for recording {}: {e:?}",
                recording.id
            );
        }
    }
}

async fn kick_off_transcription(
    db: &DatabaseConnection,
    config: &Config,
    room: &call_rooms::Model,
    recording: &call_recordings::Model,
    permanent_url: Option<&str>,
) {
    let transcript = match call_transcript::create_queued(db, recording.id, room.id).await {
        Ok(transcript) => transcript,
        Err(e) => {
            warn!(
                "Failed to create transcript record for recording {}: {e:?}",
                recording.id
            );
            return;
        }
    };

    let media_url = permanent_url
        .map(str::to_string)
        .or_else(|| recording.download_url.clone());

    let Some(media_url) = media_url else {
        warn!(
            "No media URL available for recording {}, transcript {} stays queued",
            recording.id, transcript.id
        );
        return;
    };

    let request = transcription::TranscriptionRequest {
        transcript_id: transcript.id,
        recording_id: recording.id,
        call_room_id: room.id,
        media_url,
    };

    match transcription::trigger(config, &request).await {
        Ok(true) => {
            if let Err(e) = call_transcript::mark_processing(db, transcript.id).await {
                warn!("Failed to mark transcript {} processing: {e:?}", transcript.id);
            }
        }
        Ok(false) => {}
        Err(e) => warn!(
            "Transcription kick-off failed for recording {}: {e:?}",
            recording.id
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook_event::normalize;
    use clap::Parser;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn test_config() -> Config {
        Config::parse_from(["staffing_platform_rs"])
    }

    fn a_room(status: CallRoomStatus) -> call_rooms::Model {
        let now = chrono::Utc::now();
        call_rooms::Model {
            id: Id::new_v4(),
            daily_room_name: "interview-abc123".to_string(),
            host_user_id: Id::new_v4(),
            candidate_user_id: None,
            status,
            transcription_enabled: false,
            started_at: Some((now - chrono::Duration::seconds(1800)).into()),
            ended_at: None,
            duration_seconds: None,
            job_id: None,
            application_id: None,
            agency_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn a_recording(status: CallRecordingStatus) -> call_recordings::Model {
        let now = chrono::Utc::now();
        call_recordings::Model {
            id: Id::new_v4(),
            call_room_id: Id::new_v4(),
            daily_recording_id: "rec-9".to_string(),
            status,
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

    fn count_row(count: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(count)))])
    }

    #[tokio::test]
    async fn unhandled_events_are_ignored_without_touching_the_database() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let event = normalize(&json!({ "type": "waiting-participant.joined" }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Ignored);
        assert!(outcome.follow_ups.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_recording_started_is_a_no_op() -> Result<(), Error> {
        let existing = a_recording(CallRecordingStatus::Processing);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing]])
            .into_connection();

        let event = normalize(&json!({
            "type": "recording.started",
            "room_name": "interview-abc123",
            "recording_id": "rec-9"
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Duplicate);
        assert!(outcome.follow_ups.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_recording_ready_is_a_no_op() -> Result<(), Error> {
        let existing = a_recording(CallRecordingStatus::Ready);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing]])
            .into_connection();

        let event = normalize(&json!({
            "type": "recording.ready",
            "room_name": "interview-abc123",
            "recording_id": "rec-9"
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Duplicate);
        assert!(outcome.follow_ups.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn recording_ready_updates_a_tracked_recording_and_owes_follow_up(
    ) -> Result<(), Error> {
        let room = a_room(CallRoomStatus::Active);
        let mut existing = a_recording(CallRecordingStatus::Processing);
        existing.call_room_id = room.id;

        let mut ready = existing.clone();
        ready.status = CallRecordingStatus::Ready;
        ready.duration_seconds = Some(1805);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![existing.clone()]])
            .append_query_results(vec![vec![room.clone()]])
            .append_query_results(vec![vec![existing], vec![ready.clone()]])
            .into_connection();

        let event = normalize(&json!({
            "type": "recording.ready",
            "room_name": "interview-abc123",
            "recording_id": "rec-9",
            "duration": 1805
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Applied);
        match outcome.follow_ups.as_slice() {
            [FollowUp::FinalizeRecording {
                room: owed_room,
                recording,
            }] => {
                assert_eq!(owed_room.id, room.id);
                assert_eq!(recording.status, CallRecordingStatus::Ready);
            }
            other => panic!("expected one finalize follow-up, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn recording_started_for_unknown_room_is_dropped() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // idempotency lookup, room lookup, then the diagnostic sample
            .append_query_results(vec![
                Vec::<call_recordings::Model>::new(),
            ])
            .append_query_results(vec![
                Vec::<call_rooms::Model>::new(),
                Vec::<call_rooms::Model>::new(),
            ])
            .into_connection();

        let event = normalize(&json!({
            "type": "recording.started",
            "room_name": "no-such-room",
            "recording_id": "rec-9"
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Dropped);
        Ok(())
    }

    #[tokio::test]
    async fn recording_error_for_untracked_recording_is_dropped() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<call_recordings::Model>::new()])
            .into_connection();

        let event = normalize(&json!({
            "type": "recording.error",
            "recording_id": "rec-404",
            "error": "transcode failed"
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Dropped);
        Ok(())
    }

    #[tokio::test]
    async fn meeting_ended_twice_only_applies_once() -> Result<(), Error> {
        let room = a_room(CallRoomStatus::Ended);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![room]])
            .into_connection();

        let event = normalize(&json!({
            "type": "meeting.ended",
            "room_name": "interview-abc123"
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Duplicate);
        Ok(())
    }

    #[tokio::test]
    async fn meeting_started_is_log_only() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let event = normalize(&json!({
            "type": "meeting.started",
            "room_name": "interview-abc123"
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Applied);
        assert!(outcome.follow_ups.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn first_participant_join_activates_the_room() -> Result<(), Error> {
        let room = a_room(CallRoomStatus::Created);

        let mut active = room.clone();
        active.status = CallRoomStatus::Active;

        let created = call_participants::Model {
            id: Id::new_v4(),
            call_room_id: room.id,
            user_id: None,
            display_name: "Jane Doe".to_string(),
            role: CallParticipantRole::Participant,
            status: CallParticipantStatus::Joined,
            joined_at: Some(chrono::Utc::now().into()),
            left_at: None,
            duration_seconds: None,
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![room], vec![active]])
            .append_query_results(vec![Vec::<call_participants::Model>::new()])
            .append_query_results(vec![vec![created]])
            .into_connection();

        let event = normalize(&json!({
            "type": "participant.joined",
            "room_name": "interview-abc123",
            "participant": { "user_name": "Jane Doe" }
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Applied);
        Ok(())
    }

    #[tokio::test]
    async fn meeting_ended_synthesizes_the_host_when_no_participants_were_seen(
    ) -> Result<(), Error> {
        let room = a_room(CallRoomStatus::Active);
        let host_user_id = room.host_user_id;

        let mut ended = room.clone();
        ended.status = CallRoomStatus::Ended;

        let host_account = crate::users::Model {
            id: host_user_id,
            email: "recruiter@example.com".to_string(),
            first_name: "Dana".to_string(),
            last_name: "Reyes".to_string(),
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        let synthesized = call_participants::Model {
            id: Id::new_v4(),
            call_room_id: room.id,
            user_id: Some(host_user_id),
            display_name: "Dana Reyes".to_string(),
            role: CallParticipantRole::Host,
            status: CallParticipantStatus::Left,
            joined_at: room.started_at,
            left_at: Some(chrono::Utc::now().into()),
            duration_seconds: Some(1800),
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![room]])
            .append_query_results(vec![vec![ended]])
            .append_query_results(vec![vec![count_row(0)]])
            .append_query_results(vec![Vec::<crate::candidate_profiles::Model>::new()])
            .append_query_results(vec![vec![host_account]])
            .append_query_results(vec![vec![synthesized]])
            .into_connection();

        let event = normalize(&json!({
            "type": "meeting.ended",
            "room_name": "interview-abc123"
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Applied);
        Ok(())
    }

    #[test]
    fn synthesized_attendance_covers_host_and_candidate_over_the_room_window() {
        let mut room = a_room(CallRoomStatus::Active);
        room.candidate_user_id = Some(Id::new_v4());

        let started_at = room.started_at.expect("room window start");
        let ended_at = started_at + chrono::Duration::seconds(1800);

        let rows = synthesized_attendance(&room, ended_at);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].role, CallParticipantRole::Host);
        assert_eq!(rows[0].user_id, Some(room.host_user_id));
        assert_eq!(rows[1].role, CallParticipantRole::Candidate);
        assert_eq!(rows[1].user_id, room.candidate_user_id);
        for row in &rows {
            assert_eq!(row.status, CallParticipantStatus::Left);
            assert_eq!(row.joined_at, Some(started_at));
            assert_eq!(row.left_at, Some(ended_at));
            assert_eq!(row.duration_seconds, Some(1800));
        }
    }

    #[tokio::test]
    async fn meeting_ended_synthesizes_both_host_and_candidate_rows() -> Result<(), Error> {
        let mut room = a_room(CallRoomStatus::Active);
        let candidate_user_id = Id::new_v4();
        room.candidate_user_id = Some(candidate_user_id);

        let mut ended = room.clone();
        ended.status = CallRoomStatus::Ended;

        let host_account = crate::users::Model {
            id: room.host_user_id,
            email: "recruiter@example.com".to_string(),
            first_name: "Dana".to_string(),
            last_name: "Reyes".to_string(),
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        let candidate_profile = crate::candidate_profiles::Model {
            id: Id::new_v4(),
            user_id: candidate_user_id,
            full_name: "Avery Cole".to_string(),
            headline: None,
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        let synthesized_host = call_participants::Model {
            id: Id::new_v4(),
            call_room_id: room.id,
            user_id: Some(room.host_user_id),
            display_name: "Dana Reyes".to_string(),
            role: CallParticipantRole::Host,
            status: CallParticipantStatus::Left,
            joined_at: room.started_at,
            left_at: Some(chrono::Utc::now().into()),
            duration_seconds: Some(1800),
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        let mut synthesized_candidate = synthesized_host.clone();
        synthesized_candidate.id = Id::new_v4();
        synthesized_candidate.user_id = Some(candidate_user_id);
        synthesized_candidate.display_name = "Avery Cole".to_string();
        synthesized_candidate.role = CallParticipantRole::Candidate;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![room]])
            .append_query_results(vec![vec![ended]])
            .append_query_results(vec![vec![count_row(0)]])
            // host name resolution misses the candidate profile, hits users
            .append_query_results(vec![Vec::<crate::candidate_profiles::Model>::new()])
            .append_query_results(vec![vec![host_account]])
            .append_query_results(vec![vec![synthesized_host]])
            // candidate name resolution hits the candidate profile
            .append_query_results(vec![vec![candidate_profile]])
            .append_query_results(vec![vec![synthesized_candidate]])
            .into_connection();

        let event = normalize(&json!({
            "type": "meeting.ended",
            "room_name": "interview-abc123"
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Applied);
        Ok(())
    }

    #[tokio::test]
    async fn participant_joined_creates_a_new_row() -> Result<(), Error> {
        let room = a_room(CallRoomStatus::Active);

        let created = call_participants::Model {
            id: Id::new_v4(),
            call_room_id: room.id,
            user_id: None,
            display_name: "Jane Doe".to_string(),
            role: CallParticipantRole::Participant,
            status: CallParticipantStatus::Joined,
            joined_at: Some(chrono::Utc::now().into()),
            left_at: None,
            duration_seconds: None,
            created_at: room.created_at,
            updated_at: room.updated_at,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![room]])
            .append_query_results(vec![Vec::<call_participants::Model>::new()])
            .append_query_results(vec![vec![created]])
            .into_connection();

        let event = normalize(&json!({
            "type": "participant.joined",
            "room_name": "interview-abc123",
            "participant": { "user_name": "Jane Doe — Candidate" }
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Applied);
        Ok(())
    }

    #[tokio::test]
    async fn participant_left_without_a_matching_join_is_dropped() -> Result<(), Error> {
        let room = a_room(CallRoomStatus::Active);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![room]])
            .append_query_results(vec![Vec::<call_participants::Model>::new()])
            .into_connection();

        let event = normalize(&json!({
            "type": "participant.left",
            "room_name": "interview-abc123",
            "participant": { "user_name": "Jane Doe" }
        }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Dropped);
        Ok(())
    }

    #[tokio::test]
    async fn events_without_a_room_name_are_dropped() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let event = normalize(&json!({ "type": "meeting.ended" }));

        let outcome = reconcile(&db, &test_config(), &event).await?;

        assert_eq!(outcome.disposition, Disposition::Dropped);
        Ok(())
    }
}
