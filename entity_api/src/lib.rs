pub use entity::{
    call_invitations, call_participant_role, call_participant_status, call_recording_status,
    call_participants, call_recordings, call_room_status, call_rooms, call_transcript_status,
    call_transcripts, candidate_profiles, users, Id,
};

pub mod call_invitation;
pub mod call_participant;
pub mod call_recording;
pub mod call_room;
pub mod call_transcript;
pub mod candidate_profile;
pub mod error;
pub mod user;
