//! Call room resolution for webhook reconciliation.

use crate::call_rooms::Model;
use crate::error::Error;
use entity_api::call_room;
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::call_room::{count, find_by_id, find_recent, mark_active, mark_ended};

/// How many recent rooms to dump when a lookup misses, to aid debugging
/// mismatched room names.
const DIAGNOSTIC_ROOM_SAMPLE: u64 = 5;

/// Maps a provider room name to the internal call room.
///
/// Returns None when no room matches; in that case a sample of recently
/// created rooms is logged so a mismatched name can be spotted in the logs.
/// The event cannot be reconciled without a room, so callers drop it.
pub async fn resolve_by_daily_room_name(
    db: &DatabaseConnection,
    daily_room_name: &str,
) -> Result<Option<Model>, Error> {
    let room = call_room::find_by_daily_room_name(db, daily_room_name).await?;

    if room.is_none() {
        let recent = call_room::find_recent(db, DIAGNOSTIC_ROOM_SAMPLE)
            .await
            .unwrap_or_default();
        let recent_names: Vec<&str> = recent
            .iter()
            .map(|room| room.daily_room_name.as_str())
            .collect();
        error!(
            "No call room found for daily_room_name '{daily_room_name}'; \
             most recent rooms: {recent_names:?}"
        );
    }

    Ok(room)
}
