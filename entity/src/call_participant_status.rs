use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Presence status of a call participant.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "call_participant_status"
)]
pub enum CallParticipantStatus {
    /// Participant is currently in the call
    #[sea_orm(string_value = "joined")]
    #[default]
    Joined,
    /// Participant has left the call
    #[sea_orm(string_value = "left")]
    Left,
}

impl std::fmt::Display for CallParticipantStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallParticipantStatus::Joined => write!(fmt, "joined"),
            CallParticipantStatus::Left => write!(fmt, "left"),
        }
    }
}
