//! Record encoding and the store operations behind the widget's persistence.
//!
//! Records are text: structured values are serialised to JSON, plain text is
//! kept as is, and the result is URL-encoded so any store (cookies included)
//! can hold it.

use std::borrow::Cow;
use thiserror::Error;

use crate::clock::Clock;
use crate::models::{CommentSnapshot, PersistedRecord};
use crate::store::{Expiry, KeyValueStore, StoreError};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("stored record is malformed: {0}")]
    Deserialize(serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("record is not valid URL-encoded UTF-8: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistValue {
    Text(String),
    Json(serde_json::Value),
    Snapshot(CommentSnapshot),
}

impl From<&str> for PersistValue {
    fn from(value: &str) -> Self {
        PersistValue::Text(value.to_string())
    }
}

impl From<String> for PersistValue {
    fn from(value: String) -> Self {
        PersistValue::Text(value)
    }
}

impl From<serde_json::Value> for PersistValue {
    fn from(value: serde_json::Value) -> Self {
        PersistValue::Json(value)
    }
}

impl From<CommentSnapshot> for PersistValue {
    fn from(value: CommentSnapshot) -> Self {
        PersistValue::Snapshot(value)
    }
}

impl PersistValue {
    /// Text form before URL encoding. Primitives pass through unchanged.
    pub fn to_text(&self) -> Result<String, PersistError> {
        Ok(match self {
            PersistValue::Text(s) => s.clone(),
            PersistValue::Json(serde_json::Value::String(s)) => s.clone(),
            PersistValue::Json(v @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => {
                serde_json::to_string(v)?
            }
            PersistValue::Json(v) => v.to_string(),
            PersistValue::Snapshot(snapshot) => serde_json::to_string(snapshot)?,
        })
    }
}

pub fn encode(value: &PersistValue) -> Result<String, PersistError> {
    Ok(urlencoding::encode(&value.to_text()?).into_owned())
}

pub fn decode(raw: &str) -> Result<String, PersistError> {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .map_err(|e| PersistError::Decode(e.to_string()))
}

/// Write `value` under `key`, expiring one year from `clock`'s now.
pub fn write_record(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    key: &str,
    value: &PersistValue,
) -> Result<Expiry, PersistError> {
    let encoded = encode(value)?;
    let expiry = Expiry::one_year_from(clock.now());
    store.set(key, &encoded, &expiry)?;
    Ok(expiry)
}

/// The decoded text stored under `key`, if any.
pub fn read_text(store: &dyn KeyValueStore, key: &str) -> Result<Option<String>, PersistError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(decode(&raw)?)),
        None => Ok(None),
    }
}

pub fn read_record(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<PersistedRecord>, PersistError> {
    match read_text(store, key)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(PersistError::Deserialize),
        None => Ok(None),
    }
}

/// Delete every record whose key contains `prefix`, across all instances.
/// Keys that fail to delete are logged and skipped. Returns how many were
/// removed.
pub fn clear_records(store: &dyn KeyValueStore, prefix: &str) -> usize {
    if prefix.is_empty() {
        tracing::warn!("refusing to clear records with an empty key prefix");
        return 0;
    }
    let keys = match store.keys() {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!(error = %e, "could not list persisted comments");
            return 0;
        }
    };

    let mut removed = 0;
    for key in keys.iter().filter(|k| k.contains(prefix)) {
        match store.delete(key) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(key = %key, error = %e, "could not delete persisted comment"),
        }
    }
    tracing::debug!(prefix, removed, "cleared persisted comments");
    removed
}
