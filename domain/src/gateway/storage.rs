//! Permanent object storage client.
//!
//! Provider download links expire after a few hours, so the dispatcher
//! copies finished recordings into our own bucket. Migration is best
//! effort: when it fails the temporary URL stays in place.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use log::*;
use service::config::Config;

/// Where a migrated recording ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedMedia {
    /// Permanent public URL for the media; never expires.
    pub public_url: String,
    /// Object key within the bucket.
    pub storage_key: String,
}

/// Object key a recording is stored under in the permanent bucket.
pub fn object_key(daily_recording_id: &str) -> String {
    format!("recordings/{daily_recording_id}.mp4")
}

/// Copies a recording from its temporary provider URL into permanent storage.
///
/// Returns None when permanent storage is not configured; callers keep the
/// temporary URL in that case.
pub async fn migrate_recording(
    config: &Config,
    daily_recording_id: &str,
    source_url: &str,
) -> Result<Option<MigratedMedia>, Error> {
    let (Some(base_url), Some(api_key)) = (config.storage_base_url(), config.storage_api_key())
    else {
        debug!("Permanent storage not configured, keeping temporary URL");
        return Ok(None);
    };

    let bucket = config.storage_bucket();
    let storage_key = object_key(daily_recording_id);

    info!("Migrating recording {daily_recording_id} to permanent storage as {storage_key}");

    let client = reqwest::Client::builder().use_rustls_tls().build()?;

    let media = client.get(source_url).send().await.map_err(|e| {
        warn!("Failed to download recording media: {:?}", e);
        Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
        }
    })?;

    if !media.status().is_success() {
        let status = media.status();
        warn!("Recording media download returned {status}");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Other(format!(
                "media download returned {status}"
            ))),
        });
    }

    let bytes = media.bytes().await.map_err(|e| {
        warn!("Failed to read recording media body: {:?}", e);
        Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
        }
    })?;

    let upload_url = format!("{base_url}/object/{bucket}/{storage_key}");
    let response = client
        .post(&upload_url)
        .bearer_auth(&api_key)
        .header(reqwest::header::CONTENT_TYPE, "video/mp4")
        .body(bytes)
        .send()
        .await
        .map_err(|e| {
            warn!("Failed to upload recording to permanent storage: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        warn!("Permanent storage upload failed: {error_text}");
        return Err(Error::internal_other(format!(
            "storage upload failed: {error_text}"
        )));
    }

    let public_url = format!("{base_url}/object/public/{bucket}/{storage_key}");
    info!("Recording {daily_recording_id} migrated to {public_url}");

    Ok(Some(MigratedMedia {
        public_url,
        storage_key,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config_without_storage() -> Config {
        Config::parse_from(["staffing_platform_rs"])
    }

    #[test]
    fn object_key_is_stable_for_a_recording_id() {
        assert_eq!(object_key("rec-9"), "recordings/rec-9.mp4");
    }

    #[tokio::test]
    async fn migrate_recording_is_a_no_op_without_storage_config() -> Result<(), Error> {
        let config = config_without_storage();

        let migrated =
            migrate_recording(&config, "rec-9", "https://cdn.example/rec-9.mp4").await?;

        assert_eq!(migrated, None);
        Ok(())
    }
}
