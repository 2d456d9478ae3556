use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseManager;
use crate::database::models::{Item, Location, NewItem, NewLocation, NewUser, User};
use crate::database::store::{
    ItemFilter, ItemStore, LocationStore, Store, StoreError, StoreResult, UserStore, Window,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at, deleted_at";
const ITEM_COLUMNS: &str =
    "id, name, description, owner_id, location_id, image_url, created_at, updated_at";
const LOCATION_COLUMNS: &str =
    "id, name, description, image_url, owner_id, created_at, updated_at";

/// Store backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate constraint violations and pool faults into domain errors.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::EmailTaken;
        }
        if db_err.is_foreign_key_violation() {
            // Only item writes reference a location.
            return StoreError::NotFound("Location");
        }
    }
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Sqlx(other),
    }
}

fn push_item_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ItemFilter) {
    builder.push(" WHERE owner_id = ").push_bind(filter.owner_id);
    if let Some(location_id) = filter.location_id {
        builder.push(" AND location_id = ").push_bind(location_id);
    }
    if let Some(from) = filter.created_from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(before) = filter.created_before {
        builder.push(" AND created_at < ").push_bind(before);
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn save_user(&self, user: &User) -> StoreResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(StoreError::NotFound("User"))
    }

    async fn soft_delete_user(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }

    async fn list_users(&self, window: Window) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL
             ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn count_users(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(count)
    }
}

#[async_trait]
impl ItemStore for PgStore {
    async fn create_item(&self, item: NewItem) -> StoreResult<Item> {
        sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (name, description, owner_id, location_id, image_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.owner_id)
        .bind(item.location_id)
        .bind(&item.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_item(&self, id: i64) -> StoreResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(item)
    }

    async fn list_items(&self, filter: &ItemFilter, window: Option<Window>) -> StoreResult<Vec<Item>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {ITEM_COLUMNS} FROM items"));
        push_item_filter(&mut builder, filter);
        builder.push(" ORDER BY id");
        if let Some(window) = window {
            builder.push(" LIMIT ").push_bind(window.limit);
            builder.push(" OFFSET ").push_bind(window.offset);
        }

        builder
            .build_query_as::<Item>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_items(&self, filter: &ItemFilter) -> StoreResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM items");
        push_item_filter(&mut builder, filter);

        let (count,): (i64,) = builder
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(count)
    }

    async fn save_item(&self, item: &Item) -> StoreResult<Item> {
        sqlx::query_as::<_, Item>(&format!(
            "UPDATE items SET name = $2, description = $3, location_id = $4, image_url = $5,
             updated_at = NOW()
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.location_id)
        .bind(&item.image_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(StoreError::NotFound("Item"))
    }

    async fn delete_item(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Item"));
        }
        Ok(())
    }
}

#[async_trait]
impl LocationStore for PgStore {
    async fn create_location(&self, location: NewLocation) -> StoreResult<Location> {
        sqlx::query_as::<_, Location>(&format!(
            "INSERT INTO locations (name, description, image_url, owner_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {LOCATION_COLUMNS}"
        ))
        .bind(&location.name)
        .bind(&location.description)
        .bind(&location.image_url)
        .bind(location.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn find_location(&self, id: i64) -> StoreResult<Option<Location>> {
        let location = sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(location)
    }

    async fn list_locations_visible_to(&self, owner_id: i64) -> StoreResult<Vec<Location>> {
        sqlx::query_as::<_, Location>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations
             WHERE owner_id = $1 OR owner_id IS NULL
             ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn save_location(&self, location: &Location) -> StoreResult<Location> {
        sqlx::query_as::<_, Location>(&format!(
            "UPDATE locations SET name = $2, description = $3, image_url = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {LOCATION_COLUMNS}"
        ))
        .bind(location.id)
        .bind(&location.name)
        .bind(&location.description)
        .bind(&location.image_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(StoreError::NotFound("Location"))
    }

    async fn count_items_in_location(&self, location_id: i64) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items WHERE location_id = $1")
            .bind(location_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(count)
    }

    async fn delete_location(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                let in_use = matches!(
                    &err,
                    sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation()
                );
                if in_use {
                    StoreError::LocationInUse
                } else {
                    map_sqlx_error(err)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Location"));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
