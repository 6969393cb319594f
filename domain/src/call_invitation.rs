//! Invitation reads for the diagnostics surface.

pub use entity_api::call_invitation::{count, find_recent};
