use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PipelineError;
use crate::event::StoredItem;

/// What mutation produced a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Insert,
    Modify,
    Remove,
}

/// Attribute-map snapshot of a stored item as carried on the change feed.
///
/// Consumers never receive a typed item directly; they extract one, and a
/// missing or mistyped attribute is an explicit `Extraction` error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemImage(pub Map<String, Value>);

impl ItemImage {
    /// Typed extraction of the stored item from the attribute map.
    pub fn extract(&self) -> Result<StoredItem, PipelineError> {
        Ok(StoredItem {
            id: self.attr_str("id")?,
            message: self.attr_str("message")?,
            timestamp: self.attr_i64("timestamp")?,
        })
    }

    fn attr_str(&self, name: &str) -> Result<String, PipelineError> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| PipelineError::extraction(format!("{name}: missing or not a string")))
    }

    fn attr_i64(&self, name: &str) -> Result<i64, PipelineError> {
        self.0
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| PipelineError::extraction(format!("{name}: missing or not an integer")))
    }
}

impl From<&StoredItem> for ItemImage {
    fn from(item: &StoredItem) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(item.id.clone()));
        map.insert("message".to_string(), Value::String(item.message.clone()));
        map.insert("timestamp".to_string(), Value::from(item.timestamp));
        Self(map)
    }
}

/// One notification per mutation of the keyed store, in per-key mutation
/// order, carrying before/after images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub kind: ChangeKind,
    pub old_image: Option<ItemImage>,
    pub new_image: Option<ItemImage>,
}
