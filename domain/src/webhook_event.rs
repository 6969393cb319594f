//! Normalization of video-provider webhook payloads.
//!
//! The provider has shipped several webhook payload shapes over time: the
//! same logical value may arrive top-level, under a `payload` envelope, or
//! inside a domain object (`recording`, `participant`, `room`). Each field
//! is extracted by walking a fixed priority list of JSON paths and taking
//! the first non-empty value, so the reconciler only ever sees one canonical
//! event shape.

use serde_json::Value;

/// The logical kind of an upstream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    RecordingStarted,
    RecordingReady,
    RecordingError,
    MeetingStarted,
    MeetingEnded,
    ParticipantJoined,
    ParticipantLeft,
    /// Anything we do not recognize; logged and ignored.
    Unhandled(String),
}

impl EventKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "recording.started" => EventKind::RecordingStarted,
            // Newer provider API versions tag the same event "ready-to-download"
            "recording.ready" | "recording.ready-to-download" => EventKind::RecordingReady,
            "recording.error" => EventKind::RecordingError,
            "meeting.started" => EventKind::MeetingStarted,
            "meeting.ended" => EventKind::MeetingEnded,
            "participant.joined" => EventKind::ParticipantJoined,
            "participant.left" => EventKind::ParticipantLeft,
            other => EventKind::Unhandled(other.to_string()),
        }
    }

    /// Canonical tag echoed back in webhook acknowledgments and logs.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::RecordingStarted => "recording.started",
            EventKind::RecordingReady => "recording.ready",
            EventKind::RecordingError => "recording.error",
            EventKind::MeetingStarted => "meeting.started",
            EventKind::MeetingEnded => "meeting.ended",
            EventKind::ParticipantJoined => "participant.joined",
            EventKind::ParticipantLeft => "participant.left",
            EventKind::Unhandled(tag) => tag,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

/// Participant details carried by participant.* events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantInfo {
    /// The provider-side user id; equals our internal user id when the
    /// participant joined through an authenticated meeting token.
    pub external_user_id: Option<String>,
    /// Display name with any role suffix already stripped.
    pub display_name: Option<String>,
}

/// One canonical event record, whatever shape the payload arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalEvent {
    pub kind: EventKind,
    pub daily_room_name: Option<String>,
    pub daily_recording_id: Option<String>,
    pub duration_seconds: Option<i32>,
    pub storage_key: Option<String>,
    pub participant: Option<ParticipantInfo>,
    pub error_detail: Option<String>,
}

/// Parses a raw webhook payload into a canonical event record.
pub fn normalize(payload: &Value) -> CanonicalEvent {
    let tag = first_str(payload, &[&["type"], &["event"], &["payload", "type"]])
        .unwrap_or_else(|| "unknown".to_string());
    let kind = EventKind::from_tag(&tag);

    let daily_room_name = first_str(
        payload,
        &[
            &["room_name"],
            &["payload", "room_name"],
            &["room", "name"],
            &["payload", "room", "name"],
        ],
    );

    let daily_recording_id = first_str(
        payload,
        &[
            &["recording_id"],
            &["payload", "recording_id"],
            &["recording", "id"],
            &["payload", "recording", "id"],
        ],
    );

    let duration_seconds = first_i64(
        payload,
        &[
            &["duration"],
            &["payload", "duration"],
            &["recording", "duration"],
            &["payload", "recording", "duration"],
        ],
    )
    .map(|secs| secs as i32);

    let storage_key = first_str(
        payload,
        &[
            &["s3_key"],
            &["payload", "s3_key"],
            &["recording", "s3_key"],
            &["payload", "recording", "s3_key"],
        ],
    );

    let participant = normalize_participant(payload);

    let error_detail = value_at(payload, &["error"])
        .or_else(|| value_at(payload, &["payload", "error"]))
        .map(render_error_detail);

    CanonicalEvent {
        kind,
        daily_room_name,
        daily_recording_id,
        duration_seconds,
        storage_key,
        participant,
        error_detail,
    }
}

fn normalize_participant(payload: &Value) -> Option<ParticipantInfo> {
    let external_user_id = first_str(
        payload,
        &[
            &["user_id"],
            &["payload", "user_id"],
            &["participant", "user_id"],
            &["payload", "participant", "user_id"],
        ],
    );

    let display_name = first_str(
        payload,
        &[
            &["user_name"],
            &["payload", "user_name"],
            &["participant", "user_name"],
            &["payload", "participant", "user_name"],
        ],
    )
    .map(|name| strip_role_suffix(&name))
    .filter(|name| !name.is_empty());

    if external_user_id.is_none() && display_name.is_none() {
        return None;
    }

    Some(ParticipantInfo {
        external_user_id,
        display_name,
    })
}

/// Display names arrive annotated with the joiner's role, e.g.
/// "Jane Doe — Recruiter". The suffix is presentation-only and stripped
/// before storage.
pub fn strip_role_suffix(name: &str) -> String {
    const DELIMITERS: &[&str] = &[" — ", " – ", " - "];
    const ROLE_SUFFIXES: &[&str] = &[
        "recruiter",
        "candidate",
        "host",
        "interviewer",
        "agency",
        "participant",
    ];

    let trimmed = name.trim();
    for delimiter in DELIMITERS {
        if let Some(idx) = trimmed.rfind(delimiter) {
            let suffix = trimmed[idx + delimiter.len()..].trim();
            if ROLE_SUFFIXES
                .iter()
                .any(|role| suffix.eq_ignore_ascii_case(role))
            {
                return trimmed[..idx].trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

fn value_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = payload;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// First non-empty string found along the given priority paths.
fn first_str(payload: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| value_at(payload, path))
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First numeric value found along the given priority paths.
fn first_i64(payload: &Value, paths: &[&[&str]]) -> Option<i64> {
    paths
        .iter()
        .filter_map(|path| value_at(payload, path))
        .find_map(|value| {
            value
                .as_i64()
                .or_else(|| value.as_f64().map(|f| f as i64))
        })
}

fn render_error_detail(error: &Value) -> String {
    match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_a_flat_recording_ready_payload() {
        let payload = json!({
            "event": "recording.ready",
            "room_name": "room-42",
            "recording": { "id": "rec-9", "duration": 125 }
        });

        let event = normalize(&payload);

        assert_eq!(event.kind, EventKind::RecordingReady);
        assert_eq!(event.daily_room_name.as_deref(), Some("room-42"));
        assert_eq!(event.daily_recording_id.as_deref(), Some("rec-9"));
        assert_eq!(event.duration_seconds, Some(125));
    }

    #[test]
    fn normalizes_an_enveloped_ready_to_download_payload() {
        let payload = json!({
            "type": "recording.ready-to-download",
            "payload": {
                "room_name": "interview-xyz",
                "recording_id": "abc-123",
                "duration": 1805.6,
                "s3_key": "raw/abc-123.mp4"
            }
        });

        let event = normalize(&payload);

        assert_eq!(event.kind, EventKind::RecordingReady);
        assert_eq!(event.daily_room_name.as_deref(), Some("interview-xyz"));
        assert_eq!(event.daily_recording_id.as_deref(), Some("abc-123"));
        assert_eq!(event.duration_seconds, Some(1805));
        assert_eq!(event.storage_key.as_deref(), Some("raw/abc-123.mp4"));
    }

    #[test]
    fn top_level_fields_win_over_nested_ones() {
        let payload = json!({
            "type": "recording.ready",
            "recording_id": "top-level",
            "recording": { "id": "nested" },
            "room_name": "outer",
            "payload": { "room_name": "inner" }
        });

        let event = normalize(&payload);

        assert_eq!(event.daily_recording_id.as_deref(), Some("top-level"));
        assert_eq!(event.daily_room_name.as_deref(), Some("outer"));
    }

    #[test]
    fn empty_strings_are_skipped_in_favor_of_later_paths() {
        let payload = json!({
            "type": "meeting.ended",
            "room_name": "",
            "payload": { "room_name": "the-real-room" }
        });

        let event = normalize(&payload);

        assert_eq!(event.daily_room_name.as_deref(), Some("the-real-room"));
    }

    #[test]
    fn unknown_kinds_normalize_to_unhandled() {
        let payload = json!({ "type": "waiting-participant.joined" });

        let event = normalize(&payload);

        assert_eq!(
            event.kind,
            EventKind::Unhandled("waiting-participant.joined".to_string())
        );
    }

    #[test]
    fn missing_tag_normalizes_to_unhandled_unknown() {
        let event = normalize(&json!({ "hello": "world" }));

        assert_eq!(event.kind, EventKind::Unhandled("unknown".to_string()));
    }

    #[test]
    fn participant_joined_carries_stripped_name_and_user_id() {
        let payload = json!({
            "type": "participant.joined",
            "room_name": "room-7",
            "participant": {
                "user_id": "6a1f9f3e-52ab-40fb-a1d6-1df89a0a3a01",
                "user_name": "Jane Doe — Recruiter"
            }
        });

        let event = normalize(&payload);

        let participant = event.participant.expect("participant info");
        assert_eq!(
            participant.external_user_id.as_deref(),
            Some("6a1f9f3e-52ab-40fb-a1d6-1df89a0a3a01")
        );
        assert_eq!(participant.display_name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn strip_role_suffix_handles_all_dash_variants() {
        assert_eq!(strip_role_suffix("Jane Doe — Recruiter"), "Jane Doe");
        assert_eq!(strip_role_suffix("Jane Doe – candidate"), "Jane Doe");
        assert_eq!(strip_role_suffix("Jane Doe - HOST"), "Jane Doe");
    }

    #[test]
    fn strip_role_suffix_leaves_ordinary_names_alone() {
        assert_eq!(strip_role_suffix("Jean-Luc Picard"), "Jean-Luc Picard");
        assert_eq!(strip_role_suffix("Acme - Berlin"), "Acme - Berlin");
        assert_eq!(strip_role_suffix("  padded  "), "padded");
    }

    #[test]
    fn error_detail_is_captured_from_structured_payloads() {
        let payload = json!({
            "type": "recording.error",
            "room_name": "room-1",
            "recording_id": "rec-1",
            "payload": { "error": { "code": "E42", "message": "transcode failed" } }
        });

        let event = normalize(&payload);

        let detail = event.error_detail.expect("error detail");
        assert!(detail.contains("E42"));
        assert!(detail.contains("transcode failed"));
    }
}
