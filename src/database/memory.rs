use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::{Item, Location, NewItem, NewLocation, NewUser, User};
use crate::database::store::{
    ItemFilter, ItemStore, LocationStore, Store, StoreError, StoreResult, UserStore, Window,
};

/// In-process store used by `serve --memory` and the test suites.
///
/// A single lock guards all three tables so each write is atomic with respect to the
/// cross-table checks (email uniqueness, items in a location).
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    items: BTreeMap<i64, Item>,
    locations: BTreeMap<i64, Location>,
    last_user_id: i64,
    last_item_id: i64,
    last_location_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

fn window_of<T>(rows: impl Iterator<Item = T>, window: Option<Window>) -> Vec<T> {
    match window {
        Some(w) => rows
            .skip(w.offset.max(0) as usize)
            .take(w.limit.max(0) as usize)
            .collect(),
        None => rows.collect(),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email == email && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, None) {
            return Err(StoreError::EmailTaken);
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let record = User {
            id: tables.last_user_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn save_user(&self, user: &User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(StoreError::EmailTaken);
        }

        let existing = tables
            .users
            .get_mut(&user.id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound("User"))?;
        existing.name = user.name.clone();
        existing.email = user.email.clone();
        existing.password_hash = user.password_hash.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn soft_delete_user(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound("User"))?;
        let now = Utc::now();
        existing.deleted_at = Some(now);
        existing.updated_at = now;
        Ok(())
    }

    async fn list_users(&self, window: Window) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let active = tables.users.values().filter(|u| u.deleted_at.is_none()).cloned();
        Ok(window_of(active, Some(window)))
    }

    async fn count_users(&self) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().filter(|u| u.deleted_at.is_none()).count() as i64)
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn create_item(&self, item: NewItem) -> StoreResult<Item> {
        let mut tables = self.tables.write().await;
        if !tables.locations.contains_key(&item.location_id) {
            return Err(StoreError::NotFound("Location"));
        }

        tables.last_item_id += 1;
        let now = Utc::now();
        let record = Item {
            id: tables.last_item_id,
            name: item.name,
            description: item.description,
            owner_id: item.owner_id,
            location_id: item.location_id,
            image_url: item.image_url,
            created_at: now,
            updated_at: now,
        };
        tables.items.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_item(&self, id: i64) -> StoreResult<Option<Item>> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn list_items(&self, filter: &ItemFilter, window: Option<Window>) -> StoreResult<Vec<Item>> {
        let tables = self.tables.read().await;
        let matching = tables.items.values().filter(|i| filter.matches(i)).cloned();
        Ok(window_of(matching, window))
    }

    async fn count_items(&self, filter: &ItemFilter) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.items.values().filter(|i| filter.matches(i)).count() as i64)
    }

    async fn save_item(&self, item: &Item) -> StoreResult<Item> {
        let mut tables = self.tables.write().await;
        if !tables.locations.contains_key(&item.location_id) {
            return Err(StoreError::NotFound("Location"));
        }

        let existing = tables
            .items
            .get_mut(&item.id)
            .ok_or(StoreError::NotFound("Item"))?;
        existing.name = item.name.clone();
        existing.description = item.description.clone();
        existing.location_id = item.location_id;
        existing.image_url = item.image_url.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_item(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("Item"))
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn create_location(&self, location: NewLocation) -> StoreResult<Location> {
        let mut tables = self.tables.write().await;
        tables.last_location_id += 1;
        let now = Utc::now();
        let record = Location {
            id: tables.last_location_id,
            name: location.name,
            description: location.description,
            image_url: location.image_url,
            owner_id: location.owner_id,
            created_at: now,
            updated_at: now,
        };
        tables.locations.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_location(&self, id: i64) -> StoreResult<Option<Location>> {
        Ok(self.tables.read().await.locations.get(&id).cloned())
    }

    async fn list_locations_visible_to(&self, owner_id: i64) -> StoreResult<Vec<Location>> {
        let tables = self.tables.read().await;
        Ok(tables
            .locations
            .values()
            .filter(|l| l.owner_id.map_or(true, |owner| owner == owner_id))
            .cloned()
            .collect())
    }

    async fn save_location(&self, location: &Location) -> StoreResult<Location> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .locations
            .get_mut(&location.id)
            .ok_or(StoreError::NotFound("Location"))?;
        existing.name = location.name.clone();
        existing.description = location.description.clone();
        existing.image_url = location.image_url.clone();
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn count_items_in_location(&self, location_id: i64) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .values()
            .filter(|i| i.location_id == location_id)
            .count() as i64)
    }

    async fn delete_location(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.items.values().any(|i| i.location_id == id) {
            return Err(StoreError::LocationInUse);
        }
        tables
            .locations
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("Location"))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
        }
    }

    fn new_location(owner_id: Option<i64>) -> NewLocation {
        NewLocation {
            name: "Garage".to_string(),
            description: "Shelves".to_string(),
            image_url: String::new(),
            owner_id,
        }
    }

    fn new_item(owner_id: i64, location_id: i64) -> NewItem {
        NewItem {
            name: "Drill".to_string(),
            description: "Cordless".to_string(),
            owner_id,
            location_id,
            image_url: String::new(),
        }
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("a@example.com")).await.unwrap();
        let b = store.create_user(new_user("b@example.com")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn soft_deleted_email_stays_reserved() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        store.soft_delete_user(user.id).await.unwrap();

        assert!(store.find_user_by_id(user.id).await.unwrap().is_none());
        assert!(store.find_user_by_email("a@example.com").await.unwrap().is_none());
        assert!(matches!(
            store.create_user(new_user("a@example.com")).await,
            Err(StoreError::EmailTaken)
        ));
        assert_eq!(store.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn save_user_rejects_email_of_another_account() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();
        let mut b = store.create_user(new_user("b@example.com")).await.unwrap();

        b.email = "a@example.com".to_string();
        assert!(matches!(store.save_user(&b).await, Err(StoreError::EmailTaken)));

        b.email = "b@example.com".to_string();
        b.name = "Bob".to_string();
        assert_eq!(store.save_user(&b).await.unwrap().name, "Bob");
    }

    #[tokio::test]
    async fn location_with_items_cannot_be_deleted() {
        let store = MemoryStore::new();
        let location = store.create_location(new_location(Some(1))).await.unwrap();
        let item = store.create_item(new_item(1, location.id)).await.unwrap();

        assert!(matches!(
            store.delete_location(location.id).await,
            Err(StoreError::LocationInUse)
        ));
        assert!(store.find_location(location.id).await.unwrap().is_some());

        store.delete_item(item.id).await.unwrap();
        store.delete_location(location.id).await.unwrap();
        assert!(store.find_location(location.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn items_need_an_existing_location() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.create_item(new_item(1, 42)).await,
            Err(StoreError::NotFound("Location"))
        ));
    }

    #[tokio::test]
    async fn save_item_keeps_owner() {
        let store = MemoryStore::new();
        let location = store.create_location(new_location(Some(1))).await.unwrap();
        let mut item = store.create_item(new_item(1, location.id)).await.unwrap();

        item.owner_id = 99;
        item.name = "Hammer".to_string();
        let saved = store.save_item(&item).await.unwrap();
        assert_eq!(saved.owner_id, 1);
        assert_eq!(saved.name, "Hammer");
    }

    #[tokio::test]
    async fn visible_locations_include_public_ones() {
        let store = MemoryStore::new();
        store.create_location(new_location(Some(1))).await.unwrap();
        store.create_location(new_location(Some(2))).await.unwrap();
        store.create_location(new_location(None)).await.unwrap();

        let ids: Vec<i64> = store
            .list_locations_visible_to(2)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn item_filter_and_window() {
        let store = MemoryStore::new();
        let garage = store.create_location(new_location(Some(1))).await.unwrap();
        let shed = store.create_location(new_location(Some(1))).await.unwrap();
        for _ in 0..3 {
            store.create_item(new_item(1, garage.id)).await.unwrap();
        }
        store.create_item(new_item(1, shed.id)).await.unwrap();
        store.create_item(new_item(2, garage.id)).await.unwrap();

        let mine = ItemFilter::owned_by(1);
        assert_eq!(store.count_items(&mine).await.unwrap(), 4);

        let in_garage = mine.clone().in_location(garage.id);
        assert_eq!(store.count_items(&in_garage).await.unwrap(), 3);
        assert_eq!(store.count_items_in_location(garage.id).await.unwrap(), 4);

        let page = store
            .list_items(&mine, Some(Window { offset: 2, limit: 10 }))
            .await
            .unwrap();
        assert_eq!(page.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3, 4]);

        let now = Utc::now();
        let tomorrow = ItemFilter::owned_by(1)
            .created_within(now + Duration::days(1), now + Duration::days(2));
        assert_eq!(store.count_items(&tomorrow).await.unwrap(), 0);
    }
}
