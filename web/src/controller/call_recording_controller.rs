//! Read-only recording endpoints for portal UIs.

use crate::{AppState, Error};

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use domain::call_recording as CallRecordingApi;
use domain::Id;
use log::*;

/// GET all recordings for a call room, newest first
#[utoipa::path(
    get,
    path = "/call_rooms/{id}/recordings",
    params(
        ("id" = Uuid, Path, description = "Call room id")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the room's recordings", body = [domain::call_recordings::Model]),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    Path(call_room_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("Listing recordings for call room {call_room_id}");

    let recordings =
        CallRecordingApi::find_by_call_room_id(app_state.db_conn_ref(), call_room_id).await?;

    Ok(Json(recordings))
}
