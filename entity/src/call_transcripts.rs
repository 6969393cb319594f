//! SeaORM Entity for the call_transcripts table.
//! Produced by the transcription workflow for completed recordings.

use crate::call_transcript_status::CallTranscriptStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::call_transcripts::Model)]
#[sea_orm(schema_name = "staffing_platform", table_name = "call_transcripts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub call_recording_id: Id,

    #[schema(value_type = Uuid)]
    pub call_room_id: Id,

    /// Current status of the transcription
    pub status: CallTranscriptStatus,

    /// Complete transcript text
    pub full_text: Option<String>,

    /// Generated summary of the conversation
    pub summary: Option<String>,

    /// Key points extracted from the conversation, as a JSON array of strings
    #[schema(value_type = Option<Object>)]
    pub key_points: Option<Json>,

    pub word_count: Option<i32>,

    /// Error details if transcription failed
    pub error_message: Option<String>,

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
        belongs_to = "super::call_recordings::Entity",
        from = "Column::CallRecordingId",
        to = "super::call_recordings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CallRecordings,

    #[sea_orm(
        belongs_to = "super::call_rooms::Entity",
        from = "Column::CallRoomId",
        to = "super::call_rooms::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CallRooms,
}

impl Related<super::call_recordings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallRecordings.def()
    }
}

impl Related<super::call_rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallRooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
