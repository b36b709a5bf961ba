use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use eventline_api::change::{ChangeKind, ChangeNotification, ItemImage};
use eventline_api::event::StoredItem;

use crate::journal::Journal;

/// Named keyed store: atomic full-item upsert by `id`, plus a change feed
/// receiving one notification per mutation with before/after images.
///
/// The feed append happens under the items lock, so notifications appear in
/// mutation order.
pub struct KeyedStore {
    name: String,
    items: RwLock<HashMap<String, StoredItem>>,
    feed: Arc<Journal<ChangeNotification>>,
}

impl KeyedStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: RwLock::new(HashMap::new()),
            feed: Arc::new(Journal::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the entire item with the same id. Last delivered write wins;
    /// there is no comparison against the business timestamp.
    pub fn upsert(&self, item: StoredItem) -> ChangeNotification {
        let mut guard = self.write_items();
        let old = guard.insert(item.id.clone(), item.clone());
        let notification = ChangeNotification {
            kind: if old.is_some() {
                ChangeKind::Modify
            } else {
                ChangeKind::Insert
            },
            old_image: old.as_ref().map(ItemImage::from),
            new_image: Some(ItemImage::from(&item)),
        };
        self.feed.append(notification.clone());
        drop(guard);
        notification
    }

    pub fn get(&self, id: &str) -> Option<StoredItem> {
        self.read_items().get(id).cloned()
    }

    /// All items, sorted by id for stable listings.
    pub fn items(&self) -> Vec<StoredItem> {
        let mut items: Vec<StoredItem> = self.read_items().values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        items
    }

    pub fn len(&self) -> usize {
        self.read_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn feed(&self) -> Arc<Journal<ChangeNotification>> {
        self.feed.clone()
    }

    fn write_items(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredItem>> {
        match self.items.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!(store = %self.name, "items write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn read_items(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredItem>> {
        match self.items.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!(store = %self.name, "items read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
