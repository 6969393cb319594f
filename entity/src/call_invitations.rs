//! SeaORM Entity for the call_invitations table.
//! Invitation links sent to candidates for a scheduled call room.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::call_invitations::Model)]
#[sea_orm(schema_name = "staffing_platform", table_name = "call_invitations")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub call_room_id: Id,

    /// Email address the invitation was sent to
    pub candidate_email: String,

    /// Opaque token embedded in the invitation link
    #[sea_orm(unique)]
    pub token: String,

    #[schema(value_type = String, format = DateTime)]
    pub expires_at: DateTimeWithTimeZone,

    /// Set when the candidate follows the link and joins
    #[schema(value_type = Option<String>, format = DateTime)]
    pub accepted_at: Option<DateTimeWithTimeZone>,

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
}

impl Related<super::call_rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallRooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
