use uuid::Uuid;

// Core entities
pub mod call_invitations;
pub mod call_participants;
pub mod call_recordings;
pub mod call_rooms;
pub mod call_transcripts;
pub mod candidate_profiles;
pub mod users;

// Status / role enums
pub mod call_participant_role;
pub mod call_participant_status;
pub mod call_recording_status;
pub mod call_room_status;
pub mod call_transcript_status;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
