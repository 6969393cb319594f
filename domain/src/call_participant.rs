//! Participant identity helpers for webhook reconciliation.

use crate::call_participant_role::CallParticipantRole;
use crate::call_rooms::Model as CallRoomModel;
use crate::Id;
use entity_api::{candidate_profile, user};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::call_participant::{
    count, count_for_room, create, find_by_call_room_id, find_by_room_and_identity,
    find_joined_by_room_and_identity, mark_joined, mark_left,
};

/// Placeholder when no name can be resolved from the event or any profile.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// Resolves the display name for a participant.
///
/// The event-supplied name wins when present. Otherwise the internal user's
/// name is looked up from two tiered sources: the detailed candidate profile
/// first, then the generic account profile, before falling back to "Unknown".
pub async fn resolve_display_name(
    db: &DatabaseConnection,
    user_id: Option<Id>,
    event_name: Option<&str>,
) -> String {
    if let Some(name) = event_name {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }

    let Some(user_id) = user_id else {
        return UNKNOWN_DISPLAY_NAME.to_string();
    };

    match candidate_profile::find_by_user_id(db, user_id).await {
        Ok(Some(profile)) if !profile.full_name.trim().is_empty() => {
            return profile.full_name.trim().to_string();
        }
        Ok(_) => {}
        Err(e) => warn!("Candidate profile lookup failed for user {user_id}: {e:?}"),
    }

    match user::find_by_id(db, user_id).await {
        Ok(Some(account)) => {
            let full_name = account.full_name();
            if !full_name.is_empty() {
                return full_name;
            }
        }
        Ok(None) => {}
        Err(e) => warn!("User lookup failed for user {user_id}: {e:?}"),
    }

    UNKNOWN_DISPLAY_NAME.to_string()
}

/// Determines a participant's role by comparing their internal user id
/// against the room's known host and candidate identities.
pub fn role_for(room: &CallRoomModel, user_id: Option<Id>) -> CallParticipantRole {
    match user_id {
        Some(user_id) if user_id == room.host_user_id => CallParticipantRole::Host,
        Some(user_id) if Some(user_id) == room.candidate_user_id => CallParticipantRole::Candidate,
        _ => CallParticipantRole::Participant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_room_status::CallRoomStatus;

    fn a_room(host_user_id: Id, candidate_user_id: Option<Id>) -> CallRoomModel {
        let now = chrono::Utc::now();
        CallRoomModel {
            id: Id::new_v4(),
            daily_room_name: "room-1".to_string(),
            host_user_id,
            candidate_user_id,
            status: CallRoomStatus::Active,
            transcription_enabled: false,
            started_at: None,
            ended_at: None,
            duration_seconds: None,
            job_id: None,
            application_id: None,
            agency_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn role_for_matches_host_then_candidate() {
        let host = Id::new_v4();
        let candidate = Id::new_v4();
        let room = a_room(host, Some(candidate));

        assert_eq!(role_for(&room, Some(host)), CallParticipantRole::Host);
        assert_eq!(
            role_for(&room, Some(candidate)),
            CallParticipantRole::Candidate
        );
        assert_eq!(
            role_for(&room, Some(Id::new_v4())),
            CallParticipantRole::Participant
        );
        assert_eq!(role_for(&room, None), CallParticipantRole::Participant);
    }

    #[test]
    fn role_for_without_candidate_linkage_never_returns_candidate() {
        let host = Id::new_v4();
        let room = a_room(host, None);

        assert_eq!(
            role_for(&room, Some(Id::new_v4())),
            CallParticipantRole::Participant
        );
    }
}
