//! Daily REST API client.
//!
//! The only call the reconciler needs is fetching a time-limited access
//! link for a finished recording. Provider URLs expire, which is why the
//! dispatcher later migrates the media to permanent storage.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use log::*;
use serde::Deserialize;
use service::config::Config;

/// A time-limited download link issued by the provider.
#[derive(Debug, Deserialize)]
pub struct AccessLink {
    pub download_link: String,
    /// Link expiry as a unix timestamp in seconds
    #[serde(default)]
    pub expires: Option<i64>,
}

/// Daily REST API client
pub struct DailyClient {
    client: reqwest::Client,
    base_url: String,
}

impl DailyClient {
    /// Create a new Daily client with the given API key and base URL
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", api_key);
        let mut header_value =
            reqwest::header::HeaderValue::from_str(&auth_value).map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                        "Invalid API key format".to_string(),
                    )),
                }
            })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Builds a client from config, or None when no API key is configured.
    /// Without a key recordings are still marked ready, just without a URL.
    pub fn from_config(config: &Config) -> Result<Option<Self>, Error> {
        match config.daily_api_key() {
            Some(api_key) => Ok(Some(Self::new(&api_key, config.daily_api_base_url())?)),
            None => Ok(None),
        }
    }

    /// Fetch a time-limited download link for a recording
    pub async fn fetch_access_link(&self, recording_id: &str) -> Result<AccessLink, Error> {
        let url = format!("{}/recordings/{}/access-link", self.base_url, recording_id);

        debug!("Fetching Daily access link for recording {recording_id}");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("Failed to fetch Daily access link: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        })?;

        if response.status().is_success() {
            let link: AccessLink = response.json().await.map_err(|e| {
                warn!("Failed to parse Daily access-link response: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                        "Invalid response from Daily".to_string(),
                    )),
                }
            })?;
            Ok(link)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Daily API error: {}", error_text);
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(error_text)),
            })
        }
    }
}
