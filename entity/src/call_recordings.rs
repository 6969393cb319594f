//! SeaORM Entity for the call_recordings table.
//! Tracks recording artifacts reported by the video provider.

use crate::call_recording_status::CallRecordingStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::call_recordings::Model)]
#[sea_orm(schema_name = "staffing_platform", table_name = "call_recordings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub call_room_id: Id,

    /// The provider's id for this recording artifact.
    /// Unique: this is the idempotency key for webhook deliveries.
    #[sea_orm(unique)]
    pub daily_recording_id: String,

    /// Current status of the recording
    pub status: CallRecordingStatus,

    /// Where the media currently lives ("daily" or "permanent")
    pub storage_provider: Option<String>,

    /// Object key or path within the storage provider
    pub storage_key: Option<String>,

    /// Recording duration in seconds
    pub duration_seconds: Option<i32>,

    /// Download/playback URL for the media
    pub download_url: Option<String>,

    /// Expiry for provider-issued temporary URLs.
    /// Null once the media has been migrated to permanent storage.
    #[schema(value_type = Option<String>, format = DateTime)]
    pub url_expires_at: Option<DateTimeWithTimeZone>,

    /// Error details if the recording failed
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
        belongs_to = "super::call_rooms::Entity",
        from = "Column::CallRoomId",
        to = "super::call_rooms::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    CallRooms,

    #[sea_orm(has_one = "super::call_transcripts::Entity")]
    CallTranscripts,
}

impl Related<super::call_rooms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallRooms.def()
    }
}

impl Related<super::call_transcripts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallTranscripts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
