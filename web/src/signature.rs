//! HMAC-SHA256 signature verification for provider webhooks.
//!
//! The provider signs `"{timestamp}.{rawBody}"` with the shared secret and
//! sends the hex digest in a signature header. Comparison goes through
//! `Mac::verify_slice`, which is constant-time.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Result of checking one delivery's signature headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified,
    /// No secret configured; there is nothing to check against.
    Unconfigured,
    /// One or both signature headers are absent.
    MissingHeaders,
    /// The computed digest does not match the provided signature.
    Mismatch,
}

impl Verification {
    pub fn is_trusted(&self) -> bool {
        matches!(self, Verification::Verified | Verification::Unconfigured)
    }
}

/// Checks a delivery's signature headers against the shared secret.
pub fn verify_request(secret: Option<&str>, headers: &HeaderMap, raw_body: &str) -> Verification {
    let Some(secret) = secret else {
        return Verification::Unconfigured;
    };

    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        return Verification::MissingHeaders;
    };

    if verify(secret, timestamp, raw_body, signature) {
        Verification::Verified
    } else {
        Verification::Mismatch
    }
}

/// Verifies one signature over `"{timestamp}.{raw_body}"`.
pub fn verify(secret: &str, timestamp: &str, raw_body: &str, signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature.trim_start_matches("sha256=")) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(raw_body.as_bytes());

    mac.verify_slice(&provided).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn sign(secret: &str, timestamp: &str, raw_body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{raw_body}").as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_a_correctly_signed_body() {
        let signature = sign("secret", "1767225600", r#"{"type":"meeting.ended"}"#);

        assert!(verify(
            "secret",
            "1767225600",
            r#"{"type":"meeting.ended"}"#,
            &signature
        ));
    }

    #[test]
    fn accepts_a_signature_with_scheme_prefix() {
        let signature = sign("secret", "1767225600", "body");

        assert!(verify(
            "secret",
            "1767225600",
            "body",
            &format!("sha256={signature}")
        ));
    }

    #[test]
    fn rejects_a_tampered_body() {
        let signature = sign("secret", "1767225600", "body");

        assert!(!verify("secret", "1767225600", "tampered", &signature));
    }

    #[test]
    fn rejects_a_signature_over_a_different_timestamp() {
        let signature = sign("secret", "1767225600", "body");

        assert!(!verify("secret", "1767225601", "body", &signature));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(!verify("secret", "1767225600", "body", "not-hex"));
    }

    #[test]
    fn verify_request_reports_missing_headers() {
        let headers = HeaderMap::new();

        assert_eq!(
            verify_request(Some("secret"), &headers, "body"),
            Verification::MissingHeaders
        );
    }

    #[test]
    fn verify_request_passes_through_without_a_secret() {
        let headers = HeaderMap::new();

        let verification = verify_request(None, &headers, "body");

        assert_eq!(verification, Verification::Unconfigured);
        assert!(verification.is_trusted());
    }

    #[test]
    fn verify_request_verifies_headers_end_to_end() {
        let signature = sign("secret", "1767225600", "body");

        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static("1767225600"));
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(&signature).unwrap());

        assert_eq!(
            verify_request(Some("secret"), &headers, "body"),
            Verification::Verified
        );

        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("deadbeef"));
        assert_eq!(
            verify_request(Some("secret"), &headers, "body"),
            Verification::Mismatch
        );
    }
}
