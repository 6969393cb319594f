//! SeaORM Entity for the call_participants table.
//! One row per person who joined (or was synthesized into) a call room.

use crate::call_participant_role::CallParticipantRole;
use crate::call_participant_status::CallParticipantStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::call_participants::Model)]
#[sea_orm(schema_name = "staffing_platform", table_name = "call_participants")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub call_room_id: Id,

    /// Internal user, when the provider event carried a user id we recognize.
    /// Anonymous participants (e.g. candidates joining via invitation link)
    /// have no user id and are matched by display name instead.
    #[schema(value_type = Option<Uuid>)]
    pub user_id: Option<Id>,

    /// Display name as shown in the call, with role suffixes stripped
    pub display_name: String,

    /// Role in the interview (host, candidate, other participant)
    pub role: CallParticipantRole,

    /// Whether the participant is currently joined or has left
    pub status: CallParticipantStatus,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub joined_at: Option<DateTimeWithTimeZone>,

    #[schema(value_type = Option<String>, format = DateTime)]
    pub left_at: Option<DateTimeWithTimeZone>,

    /// Time spent in the call, computed as left_at - joined_at
    pub duration_seconds: Option<i32>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::call_rooms::Entity",
        from = "Column::CallRoomId",
        to = "super::call_rooms::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CallRooms,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Users,
}

impl Related<super::call_rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallRooms.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
