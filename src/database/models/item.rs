use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::Owned;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub location_id: i64,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Item {
    const KIND: &'static str = "Item";

    fn owner_id(&self) -> Option<i64> {
        Some(self.owner_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub location_id: i64,
    pub image_url: String,
}
