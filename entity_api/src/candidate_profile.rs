//! Read operations for the candidate_profiles table.

use super::error::Error;
use entity::candidate_profiles::{Column, Entity, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, DatabaseConnection};

/// Finds the candidate profile belonging to a user, if one exists
pub async fn find_by_user_id(db: &DatabaseConnection, user_id: Id) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await?)
}
