//! Persistence interface consumed by the handlers.
//!
//! Every lookup distinguishes "no such record" (`Ok(None)` or [`StoreError::NotFound`])
//! from a storage fault. Single-record writes are atomic; nothing here spans records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::database::models::{Item, Location, NewItem, NewLocation, NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("email already registered")]
    EmailTaken,

    #[error("location still has items")]
    LocationInUse,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Predicate over one owner's items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFilter {
    pub owner_id: i64,
    pub location_id: Option<i64>,
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`
    pub created_before: Option<DateTime<Utc>>,
}

impl ItemFilter {
    pub fn owned_by(owner_id: i64) -> Self {
        Self {
            owner_id,
            location_id: None,
            created_from: None,
            created_before: None,
        }
    }

    pub fn in_location(mut self, location_id: i64) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn created_within(mut self, from: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self.created_before = Some(before);
        self
    }

    pub fn matches(&self, item: &Item) -> bool {
        item.owner_id == self.owner_id
            && self.location_id.map_or(true, |id| item.location_id == id)
            && self.created_from.map_or(true, |from| item.created_at >= from)
            && self.created_before.map_or(true, |before| item.created_at < before)
    }
}

/// Offset/limit window, already validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

/// Credential store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Active (not soft-deleted) account by email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Active account by id.
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Fails with [`StoreError::EmailTaken`] if the email is already used, including by a
    /// soft-deleted account.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Persist name, email and password hash. [`StoreError::NotFound`] if the account is
    /// gone, [`StoreError::EmailTaken`] on a duplicate email.
    async fn save_user(&self, user: &User) -> StoreResult<User>;

    async fn soft_delete_user(&self, id: i64) -> StoreResult<()>;

    async fn list_users(&self, window: Window) -> StoreResult<Vec<User>>;

    async fn count_users(&self) -> StoreResult<i64>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn create_item(&self, item: NewItem) -> StoreResult<Item>;

    async fn find_item(&self, id: i64) -> StoreResult<Option<Item>>;

    /// Matching items ordered by id.
    async fn list_items(&self, filter: &ItemFilter, window: Option<Window>) -> StoreResult<Vec<Item>>;

    async fn count_items(&self, filter: &ItemFilter) -> StoreResult<i64>;

    /// Persist mutable fields. The owner column is never written.
    async fn save_item(&self, item: &Item) -> StoreResult<Item>;

    async fn delete_item(&self, id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn create_location(&self, location: NewLocation) -> StoreResult<Location>;

    async fn find_location(&self, id: i64) -> StoreResult<Option<Location>>;

    /// Locations owned by `owner_id` plus every public location, ordered by id.
    async fn list_locations_visible_to(&self, owner_id: i64) -> StoreResult<Vec<Location>>;

    /// Persist mutable fields. The owner column is never written.
    async fn save_location(&self, location: &Location) -> StoreResult<Location>;

    /// Number of items in the location across all owners.
    async fn count_items_in_location(&self, location_id: i64) -> StoreResult<i64>;

    /// Fails with [`StoreError::LocationInUse`] while any item references the location.
    async fn delete_location(&self, id: i64) -> StoreResult<()>;
}

#[async_trait]
pub trait Store: UserStore + ItemStore + LocationStore {
    /// Cheap connectivity check for the health endpoint.
    async fn ping(&self) -> StoreResult<()>;

    /// Short backend name for diagnostics.
    fn backend(&self) -> &'static str;
}
