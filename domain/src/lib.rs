//! Business logic for the video-interview feature.
//!
//! This crate re-exports various items from the `entity_api` crate so that
//! consumers of the `domain` crate do not need to directly depend on
//! `entity_api`; the web layer works exclusively through this interface.

pub use entity_api::{
    call_invitations, call_participant_role, call_participant_status, call_participants,
    call_recording_status, call_recordings, call_room_status, call_rooms, call_transcript_status,
    call_transcripts, candidate_profiles, users, Id,
};

pub mod call_invitation;
pub mod call_participant;
pub mod call_recording;
pub mod call_room;
pub mod call_transcript;
pub mod error;
pub mod reconciler;
pub mod webhook_event;

pub mod gateway;
