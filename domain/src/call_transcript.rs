//! Transcript state, written by the transcription workflow's callbacks.

pub use entity_api::call_transcript::{
    complete, count, create_queued, fail, find_by_call_recording_id, find_by_id, mark_processing,
};
