//! Controller for handling webhooks from external services.
//!
//! Handles delivery callbacks from the video provider and the transcription
//! workflow. The provider endpoint always acknowledges with 200: the
//! provider retries on non-2xx responses, and a malformed or unprocessable
//! event will not become processable by being redelivered.

use crate::{signature, AppState, Error};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use domain::call_invitation as CallInvitationApi;
use domain::call_participant as CallParticipantApi;
use domain::call_recording as CallRecordingApi;
use domain::call_room as CallRoomApi;
use domain::call_transcript as CallTranscriptApi;
use domain::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
use domain::reconciler::{self, Disposition};
use domain::webhook_event::{self, EventKind};
use domain::Id;
use log::*;
use serde::{Deserialize, Serialize};
use service::config::VerificationMode;
use utoipa::ToSchema;

/// Acknowledgment body for provider webhook deliveries.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl WebhookAck {
    fn received(kind: &EventKind) -> Self {
        Self {
            success: true,
            received: Some(kind.as_str().to_string()),
            error: None,
        }
    }

    fn logged() -> Self {
        Self {
            success: true,
            received: None,
            error: Some("logged"),
        }
    }
}

/// POST /webhooks/daily
///
/// Ingests one delivery from the video provider. The raw body is taken as a
/// string so the signature can be verified over the exact bytes the provider
/// signed. Replies 200 regardless of the processing outcome.
#[utoipa::path(
    post,
    path = "/webhooks/daily",
    request_body = String,
    responses(
        (status = 200, description = "Delivery acknowledged", body = String)
    )
)]
pub async fn daily_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let config = &app_state.config;

    let verification = signature::verify_request(
        config.daily_webhook_secret().as_deref(),
        &headers,
        &body,
    );

    if !verification.is_trusted() {
        match config.verification_mode() {
            VerificationMode::Enforce => {
                warn!("Webhook signature verification failed ({verification:?}), discarding delivery");
                return (StatusCode::OK, Json(WebhookAck::logged()));
            }
            VerificationMode::LogOnly => {
                // Fail open: a misconfigured secret must not silently lose
                // provider events.
                warn!("Webhook signature verification failed ({verification:?}), processing anyway");
            }
        }
    }

    let payload: serde_json::Value = match serde_json::from_str(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Unparseable webhook payload ({e}): {body}");
            return (StatusCode::OK, Json(WebhookAck::logged()));
        }
    };

    let event = webhook_event::normalize(&payload);
    debug!("Received provider webhook event '{}'", event.kind);

    match reconciler::reconcile(app_state.db_conn_ref(), config, &event).await {
        Ok(outcome) => {
            if outcome.disposition == Disposition::Dropped {
                warn!(
                    "Dropped '{}' event; raw payload: {payload}",
                    event.kind
                );
            }

            if !outcome.follow_ups.is_empty() {
                // Side effects run after the acknowledgment; the provider's
                // delivery must never wait on them.
                let task_state = app_state.clone();
                tokio::spawn(async move {
                    reconciler::dispatch_follow_ups(
                        task_state.db_conn_ref(),
                        &task_state.config,
                        outcome.follow_ups,
                    )
                    .await;
                });
            }

            (StatusCode::OK, Json(WebhookAck::received(&event.kind)))
        }
        Err(e) => {
            error!("Failed to reconcile '{}' event: {e:?}", event.kind);
            (StatusCode::OK, Json(WebhookAck::logged()))
        }
    }
}

/// Transcription workflow callback payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranscriptionCallbackPayload {
    #[schema(value_type = Uuid)]
    pub transcript_id: Id,
    pub status: TranscriptionCallbackStatus,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_points: Option<serde_json::Value>,
    #[serde(default)]
    pub word_count: Option<i32>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionCallbackStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

/// Response for transcription callback acknowledgment
#[derive(Debug, Serialize)]
pub struct TranscriptionCallbackResponse {
    pub status: String,
}

/// POST /webhooks/transcription
///
/// Receives results from the transcription workflow kicked off when a
/// recording became ready. Terminal statuses land exactly once: a repeat
/// for an already-completed or already-failed transcript is acknowledged
/// but ignored.
#[utoipa::path(
    post,
    path = "/webhooks/transcription",
    responses(
        (status = 200, description = "Callback acknowledged", body = String),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn transcription_webhook(
    State(app_state): State<AppState>,
    Json(payload): Json<TranscriptionCallbackPayload>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "Received transcription callback for transcript {} ({:?})",
        payload.transcript_id, payload.status
    );

    let db = app_state.db_conn_ref();

    let result = match payload.status {
        TranscriptionCallbackStatus::Queued | TranscriptionCallbackStatus::Processing => {
            // Progress updates carry no content.
            return Ok((
                StatusCode::OK,
                Json(TranscriptionCallbackResponse {
                    status: "ok".to_string(),
                }),
            ));
        }
        TranscriptionCallbackStatus::Completed => {
            CallTranscriptApi::complete(
                db,
                payload.transcript_id,
                payload.full_text,
                payload.summary,
                payload.key_points,
                payload.word_count,
            )
            .await
        }
        TranscriptionCallbackStatus::Error => {
            warn!(
                "Transcription failed for transcript {}: {:?}",
                payload.transcript_id, payload.error
            );
            CallTranscriptApi::fail(db, payload.transcript_id, payload.error).await
        }
    };

    match result {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(TranscriptionCallbackResponse {
                status: "ok".to_string(),
            }),
        )),
        Err(e) => {
            let domain_error: domain::error::Error = e.into();
            if domain_error.error_kind
                == DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
            {
                debug!(
                    "Transcript {} is already terminal, ignoring callback",
                    payload.transcript_id
                );
                Ok((
                    StatusCode::OK,
                    Json(TranscriptionCallbackResponse {
                        status: "ignored".to_string(),
                    }),
                ))
            } else {
                Err(domain_error.into())
            }
        }
    }
}

/// Aggregate view of reconciled state, for operators chasing down a
/// misbehaving delivery.
#[derive(Debug, Serialize)]
pub struct WebhookDiagnostics {
    pub call_room_count: u64,
    pub call_recording_count: u64,
    pub call_participant_count: u64,
    pub call_transcript_count: u64,
    pub call_invitation_count: u64,
    pub recent_rooms: Vec<RecentRoom>,
    pub recent_invitations: Vec<RecentInvitation>,
}

#[derive(Debug, Serialize)]
pub struct RecentRoom {
    pub id: Id,
    pub daily_room_name: String,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Serialize)]
pub struct RecentInvitation {
    pub id: Id,
    pub call_room_id: Id,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

const RECENT_ROW_LIMIT: u64 = 10;

/// GET /webhooks/daily/diagnostics
///
/// Row counts plus the most recent rooms and invitations. Useful when a
/// provider delivery references a room name that cannot be matched.
#[utoipa::path(
    get,
    path = "/webhooks/daily/diagnostics",
    responses(
        (status = 200, description = "Current reconciled-state summary", body = String),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn diagnostics(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let db = app_state.db_conn_ref();

    let recent_rooms = CallRoomApi::find_recent(db, RECENT_ROW_LIMIT)
        .await?
        .into_iter()
        .map(|room| RecentRoom {
            id: room.id,
            daily_room_name: room.daily_room_name,
            status: room.status.to_string(),
            created_at: room.created_at,
        })
        .collect();

    let recent_invitations = CallInvitationApi::find_recent(db, RECENT_ROW_LIMIT)
        .await?
        .into_iter()
        .map(|invitation| RecentInvitation {
            id: invitation.id,
            call_room_id: invitation.call_room_id,
            created_at: invitation.created_at,
        })
        .collect();

    let diagnostics = WebhookDiagnostics {
        call_room_count: CallRoomApi::count(db).await?,
        call_recording_count: CallRecordingApi::count(db).await?,
        call_participant_count: CallParticipantApi::count(db).await?,
        call_transcript_count: CallTranscriptApi::count(db).await?,
        call_invitation_count: CallInvitationApi::count(db).await?,
        recent_rooms,
        recent_invitations,
    };

    Ok(Json(diagnostics))
}
