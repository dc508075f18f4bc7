//! Key/value text store capability used for persistence.

use chrono::{DateTime, Duration, Utc};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use thiserror::Error;

use crate::clock::Clock;

/// Records live for one year after their last write.
pub const RECORD_LIFETIME_DAYS: i64 = 365;

/// Path scope covering the whole site.
pub const SITE_PATH: &str = "/";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store is not available in this environment")]
    Unavailable,
    #[error("store rejected the write: {0}")]
    Rejected(String),
    #[error("malformed stored value: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    pub expires: DateTime<Utc>,
    pub path: String,
}

impl Expiry {
    pub fn one_year_from(now: DateTime<Utc>) -> Self {
        Self {
            expires: now + Duration::days(RECORD_LIFETIME_DAYS),
            path: SITE_PATH.to_string(),
        }
    }
}

pub trait KeyValueStore {
    /// `false` when there is no backend at all (e.g. no document to hold
    /// cookies). Callers treat that exactly like persistence being off.
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str, expiry: &Expiry) -> Result<(), StoreError>;

    /// Every live key, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expiry: Expiry,
}

/// In-memory store honouring expirations against an injected clock.
pub struct MemoryStore {
    clock: Rc<dyn Clock>,
    available: bool,
    entries: RefCell<BTreeMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            available: true,
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    /// A store that reports itself missing and refuses every operation.
    pub fn unavailable(clock: Rc<dyn Clock>) -> Self {
        Self {
            available: false,
            ..Self::new(clock)
        }
    }

    /// The stored expiry of a live key.
    pub fn expiry(&self, key: &str) -> Option<Expiry> {
        self.purge_expired();
        self.entries.borrow().get(key).map(|e| e.expiry.clone())
    }

    pub fn len(&self) -> usize {
        self.purge_expired();
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries.borrow_mut().retain(|_, e| e.expiry.expires > now);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn is_available(&self) -> bool {
        self.available
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        self.purge_expired();
        Ok(self.entries.borrow().get(key).map(|e| e.value.clone()))
    }

    fn set(&self, key: &str, value: &str, expiry: &Expiry) -> Result<(), StoreError> {
        self.check()?;
        self.entries.borrow_mut().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expiry: expiry.clone(),
            },
        );
        self.purge_expired();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.check()?;
        self.purge_expired();
        Ok(self.entries.borrow().keys().cloned().collect())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn clock() -> Rc<ManualClock> {
        Rc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()))
    }

    #[test]
    fn test_one_year_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
        let expiry = Expiry::one_year_from(now);
        assert_eq!(expiry.expires, Utc.with_ymd_and_hms(2026, 6, 1, 8, 30, 0).unwrap());
        assert_eq!(expiry.path, "/");
    }

    #[test]
    fn test_set_get_delete() {
        let clock = clock();
        let store = MemoryStore::new(clock.clone());
        let expiry = Expiry::one_year_from(clock.now());
        store.set("a", "1", &expiry).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.expiry("a"), Some(expiry));
        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_entries_expire() {
        let clock = clock();
        let store = MemoryStore::new(clock.clone());
        store.set("a", "1", &Expiry::one_year_from(clock.now())).unwrap();
        clock.advance(Duration::days(RECORD_LIFETIME_DAYS) - Duration::seconds(1));
        assert_eq!(store.len(), 1);
        clock.advance(Duration::seconds(1));
        assert!(store.is_empty());
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_past_expiry_deletes() {
        let clock = clock();
        let store = MemoryStore::new(clock.clone());
        store.set("a", "1", &Expiry::one_year_from(clock.now())).unwrap();
        let past = Expiry {
            expires: clock.now() - Duration::days(1),
            path: SITE_PATH.into(),
        };
        store.set("a", "", &past).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_unavailable_store_refuses() {
        let clock = clock();
        let store = MemoryStore::unavailable(clock.clone());
        assert!(!store.is_available());
        assert_eq!(store.get("a"), Err(StoreError::Unavailable));
        assert_eq!(
            store.set("a", "1", &Expiry::one_year_from(clock.now())),
            Err(StoreError::Unavailable)
        );
    }
}
