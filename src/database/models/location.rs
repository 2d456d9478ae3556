use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::Owned;

/// A place items are kept. `owner_id = None` marks a public location.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Location {
    const KIND: &'static str = "Location";
    const PUBLIC_WHEN_UNOWNED: bool = true;

    fn owner_id(&self) -> Option<i64> {
        self.owner_id
    }
}

#[derive(Debug, Clone)]
pub struct NewLocation {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub owner_id: Option<i64>,
}
