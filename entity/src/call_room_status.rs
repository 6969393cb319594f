use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a call room.
///
/// Transitions are monotonic forward: created -> waiting/active -> ended.
#[derive(
    Debug, Clone, Eq, PartialEq, EnumIter, Deserialize, Default, Serialize, DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "call_room_status")]
pub enum CallRoomStatus {
    /// Room has been scheduled but nobody has joined yet
    #[sea_orm(string_value = "created")]
    #[default]
    Created,
    /// At least one side is waiting in the lobby
    #[sea_orm(string_value = "waiting")]
    Waiting,
    /// The call is in progress
    #[sea_orm(string_value = "active")]
    Active,
    /// The call has ended
    #[sea_orm(string_value = "ended")]
    Ended,
}

impl CallRoomStatus {
    /// Whether a room in this status may still transition to `Ended`.
    pub fn can_end(&self) -> bool {
        !matches!(self, CallRoomStatus::Ended)
    }
}

impl std::fmt::Display for CallRoomStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallRoomStatus::Created => write!(fmt, "created"),
            CallRoomStatus::Waiting => write!(fmt, "waiting"),
            CallRoomStatus::Active => write!(fmt, "active"),
            CallRoomStatus::Ended => write!(fmt, "ended"),
        }
    }
}
