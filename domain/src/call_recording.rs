//! Recording state, exposed to the web layer for the portal read surface.

pub use entity_api::call_recording::{
    count, create, find_by_call_room_id, find_by_daily_recording_id, find_by_id, update,
    update_status,
};
