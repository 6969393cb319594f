use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status of a call recording through its lifecycle.
///
/// Only advances processing -> ready | failed, never regresses.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "call_recording_status"
)]
pub enum CallRecordingStatus {
    /// The provider is still processing or uploading the recording
    #[sea_orm(string_value = "processing")]
    #[default]
    Processing,
    /// Recording is complete and available
    #[sea_orm(string_value = "ready")]
    Ready,
    /// Recording failed at some stage
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl CallRecordingStatus {
    /// Terminal statuses mark a recording as fully processed; a webhook that
    /// finds one is a duplicate delivery.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallRecordingStatus::Ready)
    }
}

impl std::fmt::Display for CallRecordingStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallRecordingStatus::Processing => write!(fmt, "processing"),
            CallRecordingStatus::Ready => write!(fmt, "ready"),
            CallRecordingStatus::Failed => write!(fmt, "failed"),
        }
    }
}
