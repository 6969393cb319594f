//! Transcription workflow trigger.
//!
//! Kick-off is an internal HTTP request carrying the best available media
//! URL and the internal recording id as the linkage key. The workflow
//! reports results back through the transcription callback endpoint.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::Id;
use log::*;
use serde::Serialize;
use service::config::Config;

/// Request body sent to the transcription workflow.
#[derive(Debug, Serialize)]
pub struct TranscriptionRequest {
    /// Internal transcript row awaiting this job's results
    pub transcript_id: Id,
    /// Internal recording id -- not the provider's recording id
    pub recording_id: Id,
    pub call_room_id: Id,
    /// Best available media URL (permanent preferred, temporary fallback)
    pub media_url: String,
}

/// Issues the transcription kick-off request.
///
/// Returns false when no transcription endpoint is configured.
pub async fn trigger(config: &Config, request: &TranscriptionRequest) -> Result<bool, Error> {
    let Some(endpoint) = config.transcription_endpoint_url() else {
        debug!("Transcription endpoint not configured, skipping kick-off");
        return Ok(false);
    };

    info!(
        "Triggering transcription for recording {} (transcript {})",
        request.recording_id, request.transcript_id
    );

    let client = reqwest::Client::builder().use_rustls_tls().build()?;

    let response = client
        .post(&endpoint)
        .json(request)
        .send()
        .await
        .map_err(|e| {
            warn!("Failed to reach transcription endpoint: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

    if response.status().is_success() {
        Ok(true)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        warn!("Transcription kick-off rejected: {error_text}");
        Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
        })
    }
}
