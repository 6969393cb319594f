//! Outward webhook notification for agency-linked recordings.
//!
//! Fired only for rooms carrying both an application and an agency linkage,
//! so agency integrations learn that an interview recording is available.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use crate::Id;
use log::*;
use serde::Serialize;
use service::config::Config;

#[derive(Debug, Serialize)]
pub struct RecordingReadyNotification {
    pub event: &'static str,
    pub call_room_id: Id,
    pub application_id: Id,
    pub agency_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Id>,
    pub recording_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl RecordingReadyNotification {
    pub fn new(
        call_room_id: Id,
        application_id: Id,
        agency_id: Id,
        job_id: Option<Id>,
        recording_id: Id,
        download_url: Option<String>,
    ) -> Self {
        Self {
            event: "recording.ready",
            call_room_id,
            application_id,
            agency_id,
            job_id,
            recording_id,
            download_url,
        }
    }
}

/// Posts the notification. Returns false when no notification URL is configured.
pub async fn notify_recording_ready(
    config: &Config,
    notification: &RecordingReadyNotification,
) -> Result<bool, Error> {
    let Some(url) = config.agency_notification_url() else {
        debug!("Agency notification URL not configured, skipping notification");
        return Ok(false);
    };

    info!(
        "Notifying agency webhook of ready recording {} for room {}",
        notification.recording_id, notification.call_room_id
    );

    let client = reqwest::Client::builder().use_rustls_tls().build()?;

    let response = client
        .post(&url)
        .json(notification)
        .send()
        .await
        .map_err(|e| {
            warn!("Failed to reach agency notification webhook: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

    if response.status().is_success() {
        Ok(true)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        warn!("Agency notification rejected: {error_text}");
        Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
        })
    }
}
