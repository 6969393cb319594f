use crate::{controller::health_check_controller, AppState};
use axum::{
    routing::{get, post},
    Router,
};

use crate::controller::{call_recording_controller, webhook_controller};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Staffing Platform API"
        ),
        paths(
            health_check_controller::health_check,
            webhook_controller::daily_webhook,
            webhook_controller::transcription_webhook,
            webhook_controller::diagnostics,
            call_recording_controller::index,
        ),
        components(
            schemas(
                domain::call_rooms::Model,
                domain::call_recordings::Model,
                domain::call_participants::Model,
                domain::call_transcripts::Model,
                domain::call_invitations::Model,
                domain::users::Model,
            )
        ),
        tags(
            (name = "staffing_platform", description = "Staffing Platform video-interview API")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(webhook_routes(app_state.clone()))
        .merge(call_recording_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Webhook endpoints authenticate via signature verification, not sessions.
fn webhook_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/webhooks/daily", post(webhook_controller::daily_webhook))
        .route(
            "/webhooks/daily/diagnostics",
            get(webhook_controller::diagnostics),
        )
        .route(
            "/webhooks/transcription",
            post(webhook_controller::transcription_webhook),
        )
        .with_state(app_state)
}

fn call_recording_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/call_rooms/:id/recordings",
            get(call_recording_controller::index),
        )
        .with_state(app_state)
}
