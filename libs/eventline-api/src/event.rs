use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// The canonical business event, carried end-to-end.
///
/// All fields are serde-defaulted so that a missing field surfaces as a
/// field-named validation error rather than a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    /// Origin timestamp, whole seconds since epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl Event {
    /// Check required fields in order: id → message → timestamp.
    /// First failure wins; the message names the field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.id.is_empty() {
            return Err(PipelineError::validation("id is required"));
        }
        if self.message.is_empty() {
            return Err(PipelineError::validation("message is required"));
        }
        if self.timestamp == 0 {
            return Err(PipelineError::validation("timestamp is required"));
        }
        Ok(())
    }
}

/// The item held in the keyed store. Same logical schema as [`Event`];
/// an upsert replaces the entire item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: String,
    pub message: String,
    pub timestamp: i64,
}

impl From<Event> for StoredItem {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            message: event.message,
            timestamp: event.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn event(id: &str, message: &str, timestamp: i64) -> Event {
        Event {
            id: id.to_string(),
            message: message.to_string(),
            timestamp,
        }
    }

    #[test]
    fn valid_event_passes() {
        assert!(event("a", "hi", 1000).validate().is_ok());
    }

    #[test]
    fn empty_id_fails_first() {
        // id is checked before message and timestamp.
        let err = event("", "", 0).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message, "id is required");
    }

    #[test]
    fn empty_message_fails_second() {
        let err = event("a", "", 0).validate().unwrap_err();
        assert_eq!(err.message, "message is required");
    }

    #[test]
    fn zero_timestamp_fails_last() {
        let err = event("a", "hi", 0).validate().unwrap_err();
        assert_eq!(err.message, "timestamp is required");
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let event: Event = serde_json::from_str(r#"{"id":"a"}"#).unwrap();
        assert_eq!(event.message, "");
        assert_eq!(event.timestamp, 0);
    }

    #[test]
    fn stored_item_keeps_all_fields() {
        let item: StoredItem = event("a", "hi", 1000).into();
        assert_eq!(item.id, "a");
        assert_eq!(item.message, "hi");
        assert_eq!(item.timestamp, 1000);
    }
}
