//! Cookie-backed store.
//!
//! A browser exposes cookies as one `name=value; name2=value2` string for
//! reading and accepts one `name=value; expires=...; path=...` assignment per
//! write. `CookieJar` is exactly that surface; `CookieStore` turns it into a
//! `KeyValueStore`. Values must already be cookie-safe (the persistence layer
//! URL-encodes before writing).

use chrono::{DateTime, NaiveDateTime, Utc};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::clock::Clock;
use crate::store::{Expiry, KeyValueStore, StoreError};

/// Expiry used to delete a cookie.
pub const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn format_http_date(t: DateTime<Utc>) -> String {
    t.format(HTTP_DATE_FORMAT).to_string()
}

pub fn parse_http_date(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s.trim(), HTTP_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn assignment(key: &str, value: &str, expiry: &Expiry) -> String {
    format!(
        "{key}={value}; expires={}; path={}",
        format_http_date(expiry.expires),
        expiry.path
    )
}

pub fn deletion(key: &str, path: &str) -> String {
    format!("{key}=; expires={EXPIRED_DATE}; path={path}")
}

/// Split a `document.cookie` style string into `(name, value)` pairs.
/// Fragments without `=` are skipped.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

pub trait CookieJar {
    fn is_available(&self) -> bool;

    /// The current cookie string, `None` when there is no document.
    fn read(&self) -> Option<String>;

    fn write(&self, assignment: &str) -> Result<(), StoreError>;
}

pub struct CookieStore<J> {
    jar: J,
}

impl<J: CookieJar> CookieStore<J> {
    pub fn new(jar: J) -> Self {
        Self { jar }
    }

    pub fn jar(&self) -> &J {
        &self.jar
    }

    fn pairs(&self) -> Result<Vec<(String, String)>, StoreError> {
        let header = self.jar.read().ok_or(StoreError::Unavailable)?;
        Ok(parse_cookie_header(&header))
    }
}

impl<J: CookieJar> KeyValueStore for CookieStore<J> {
    fn is_available(&self) -> bool {
        self.jar.is_available()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .pairs()?
            .into_iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value))
    }

    fn set(&self, key: &str, value: &str, expiry: &Expiry) -> Result<(), StoreError> {
        if value.contains(';') {
            return Err(StoreError::Encoding(format!("unescaped ';' in value for {key}")));
        }
        self.jar.write(&assignment(key, value, expiry))
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.pairs()?.into_iter().map(|(name, _)| name).collect())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.jar.write(&deletion(key, crate::store::SITE_PATH))
    }
}

/// A jar that interprets assignments the way a browser does (expiry and
/// deletion included) without one. Paths are recorded but not matched.
pub struct MemoryCookieJar {
    clock: Rc<dyn Clock>,
    cookies: RefCell<BTreeMap<String, (String, Option<DateTime<Utc>>)>>,
    writes: RefCell<Vec<String>>,
}

impl MemoryCookieJar {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            cookies: RefCell::new(BTreeMap::new()),
            writes: RefCell::new(Vec::new()),
        }
    }

    /// Raw assignment strings received, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }
}

impl CookieJar for MemoryCookieJar {
    fn is_available(&self) -> bool {
        true
    }

    fn read(&self) -> Option<String> {
        let now = self.clock.now();
        let cookies = self.cookies.borrow();
        let live: Vec<String> = cookies
            .iter()
            .filter(|(_, (_, expires))| expires.map_or(true, |t| t > now))
            .map(|(name, (value, _))| format!("{name}={value}"))
            .collect();
        Some(live.join("; "))
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        let mut parts = assignment.split(';');
        let (name, value) = parts
            .next()
            .and_then(|first| first.split_once('='))
            .ok_or_else(|| StoreError::Rejected(assignment.to_string()))?;

        let mut expires = None;
        for attr in parts {
            if let Some((k, v)) = attr.trim().split_once('=') {
                if k.eq_ignore_ascii_case("expires") {
                    expires = Some(
                        parse_http_date(v)
                            .ok_or_else(|| StoreError::Rejected(format!("bad expires: {v}")))?,
                    );
                }
            }
        }

        self.writes.borrow_mut().push(assignment.to_string());
        let mut cookies = self.cookies.borrow_mut();
        match expires {
            Some(t) if t <= self.clock.now() => {
                cookies.remove(name.trim());
            }
            _ => {
                cookies.insert(name.trim().to_string(), (value.trim().to_string(), expires));
            }
        }
        Ok(())
    }
}
