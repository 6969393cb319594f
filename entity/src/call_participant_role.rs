use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role a participant plays in a video interview.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "call_participant_role"
)]
pub enum CallParticipantRole {
    /// The recruiter or interviewer hosting the call
    #[sea_orm(string_value = "host")]
    Host,
    /// The candidate being interviewed
    #[sea_orm(string_value = "candidate")]
    Candidate,
    /// Anyone else (observer, agency contact, unidentified user)
    #[sea_orm(string_value = "participant")]
    #[default]
    Participant,
}

impl std::fmt::Display for CallParticipantRole {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallParticipantRole::Host => write!(fmt, "host"),
            CallParticipantRole::Candidate => write!(fmt, "candidate"),
            CallParticipantRole::Participant => write!(fmt, "participant"),
        }
    }
}
