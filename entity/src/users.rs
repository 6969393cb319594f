//! SeaORM Entity for the users table.
//! Generic account profile; the secondary lookup source for participant names.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::users::Model)]
#[sea_orm(schema_name = "staffing_platform", table_name = "users")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    #[schema(value_type = Uuid)]
    pub id: Id,

    #[sea_orm(unique)]
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// "First Last", trimmed; empty when neither name is set.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::candidate_profiles::Entity")]
    CandidateProfiles,

    #[sea_orm(has_many = "super::call_participants::Entity")]
    CallParticipants,
}

impl Related<super::candidate_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CandidateProfiles.def()
    }
}

impl Related<super::call_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CallParticipants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
