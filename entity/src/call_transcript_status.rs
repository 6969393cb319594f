use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a call transcript through its lifecycle.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "call_transcript_status"
)]
pub enum CallTranscriptStatus {
    /// Transcription has been requested but not started
    #[sea_orm(string_value = "queued")]
    #[default]
    Queued,
    /// Transcription is being processed by the transcription workflow
    #[sea_orm(string_value = "processing")]
    Processing,
    /// Transcript complete and available
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Transcription failed
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl CallTranscriptStatus {
    /// Completed and Failed are terminal and must be reached exactly once.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CallTranscriptStatus::Completed | CallTranscriptStatus::Failed
        )
    }
}

impl std::fmt::Display for CallTranscriptStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallTranscriptStatus::Queued => write!(fmt, "queued"),
            CallTranscriptStatus::Processing => write!(fmt, "processing"),
            CallTranscriptStatus::Completed => write!(fmt, "completed"),
            CallTranscriptStatus::Failed => write!(fmt, "failed"),
        }
    }
}
