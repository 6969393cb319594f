//! Read operations for the call_invitations table.
//!
//! Invitations are created by the scheduling flow; this layer only exposes
//! the read surface used by diagnostics.

use super::error::Error;
use entity::call_invitations::{Column, Entity, Model};
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, QuerySelect};

/// Most recently created invitations, newest first
pub async fn find_recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?)
}

/// Total number of invitations
pub async fn count(db: &DatabaseConnection) -> Result<u64, Error> {
    Ok(Entity::find().count(db).await?)
}
