//! # Event Store
//!
//! Persistence seam for accepted events. Writes are idempotent on
//! `event_id`: inserting an event whose id is already stored succeeds and
//! reports `false` without touching the stored copy.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure while persisting an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The payload carries no string `event_id` to key the write on.
    #[error("event_id is missing or not a string")]
    MissingEventId,

    /// The backing store cannot take writes.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Destination for validated events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist one event. Returns `true` when the event was newly stored and
    /// `false` when an event with the same `event_id` already existed.
    async fn insert_event(&self, payload: &Map<String, Value>) -> Result<bool, StoreError>;

    /// Report whether the store can accept writes.
    async fn ready(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Inner {
    order: Vec<String>,
    events: HashMap<String, Value>,
}

/// Thread-safe, cloneable in-memory event store.
///
/// The lock is `parking_lot` and is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct events stored.
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a stored event by id.
    pub fn get(&self, event_id: &str) -> Option<Value> {
        self.inner.read().events.get(event_id).cloned()
    }

    /// All stored events in first-insertion order.
    pub fn events(&self) -> Vec<Value> {
        let guard = self.inner.read();
        guard
            .order
            .iter()
            .filter_map(|id| guard.events.get(id).cloned())
            .collect()
    }

    fn insert(&self, payload: &Map<String, Value>) -> Result<bool, StoreError> {
        let event_id = payload
            .get("event_id")
            .and_then(Value::as_str)
            .ok_or(StoreError::MissingEventId)?;

        let mut guard = self.inner.write();
        if guard.events.contains_key(event_id) {
            return Ok(false);
        }
        guard.order.push(event_id.to_string());
        guard
            .events
            .insert(event_id.to_string(), Value::Object(payload.clone()));
        Ok(true)
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert_event(&self, payload: &Map<String, Value>) -> Result<bool, StoreError> {
        self.insert(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str, event_type: &str) -> Map<String, Value> {
        match json!({"event_id": id, "event_type": event_type}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn insert_is_idempotent_on_event_id() {
        let store = InMemoryEventStore::new();
        assert!(store.insert_event(&event("e-1", "run.started")).await.unwrap());
        assert!(!store.insert_event(&event("e-1", "run.failed")).await.unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("e-1").unwrap()["event_type"], "run.started");
    }

    #[tokio::test]
    async fn events_keep_insertion_order() {
        let store = InMemoryEventStore::new();
        for id in ["c", "a", "b"] {
            store.insert_event(&event(id, "step.started")).await.unwrap();
        }
        let ids: Vec<_> = store
            .events()
            .iter()
            .map(|e| e["event_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn missing_event_id_is_rejected() {
        let store = InMemoryEventStore::new();
        let mut payload = event("x", "run.started");
        payload.insert("event_id".into(), json!(7));
        assert_eq!(
            store.insert_event(&payload).await,
            Err(StoreError::MissingEventId)
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = InMemoryEventStore::new();
        let shared: Arc<dyn EventStore> = Arc::new(store.clone());
        assert!(shared.insert_event(&event("e-2", "tool.called")).await.unwrap());
        assert!(shared.ready().await.is_ok());
        assert_eq!(store.len(), 1);
    }
}
