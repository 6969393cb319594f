//! SeaORM Entity for the call_rooms table.
//! One row per scheduled video-interview session.

use crate::call_room_status::CallRoomStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::call_rooms::Model)]
#[sea_orm(schema_name = "staffing_platform", table_name = "call_rooms")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    /// The video provider's own room identifier, distinct from our id.
    /// Webhook events reference rooms by this name.
    #[sea_orm(unique)]
    pub daily_room_name: String,

    /// The recruiter hosting the interview
    #[schema(value_type = Uuid)]
    pub host_user_id: Id,

    /// The invited candidate, once they have an account
    #[schema(value_type = Option<Uuid>)]
    pub candidate_user_id: Option<Id>,

    /// Current lifecycle status of the room
    pub status: CallRoomStatus,

    /// Whether a transcript should be produced for recordings of this room
    pub transcription_enabled: bool,

    /// When the call actually started
    #[schema(value_type = Option<String>, format = DateTime)]
    pub started_at: Option<DateTimeWithTimeZone>,

    /// When the call ended
    #[schema(value_type = Option<String>, format = DateTime)]
    pub ended_at: Option<DateTimeWithTimeZone>,

    /// Call duration in seconds, set when the room ends
    pub duration_seconds: Option<i32>,

    /// Optional linkage to the job this interview is for.
    /// Added in a later migration; older deployments may lack this column.
    #[schema(value_type = Option<Uuid>)]
    pub job_id: Option<Id>,

    /// Optional linkage to the candidate's application
    #[schema(value_type = Option<Uuid>)]
    pub application_id: Option<Id>,

    /// Optional linkage to the staffing agency involved
    #[schema(value_type = Option<Uuid>)]
    pub agency_id: Option<Id>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::call_recordings::Entity")]
    CallRecordings,

    #[sea_orm(has_many = "super::call_participants::Entity")]
    CallParticipants,

    #[sea_orm(has_many = "super::call_transcripts::Entity")]
    CallTranscripts,

    #[sea_orm(has_many = "super::call_invitations::Entity")]
    CallInvitations,
}

impl Related<super::call_recordings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallRecordings.def()
    }
}

impl Related<super::call_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallParticipants.def()
    }
}

impl Related<super::call_transcripts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallTranscripts.def()
    }
}

impl Related<super::call_invitations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallInvitations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
