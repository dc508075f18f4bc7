use std::sync::Arc;

use map_comment_shared::cookie::CookieJar;
use map_comment_shared::ids::{init_id_generator, CounterIds};
use map_comment_shared::store::{KeyValueStore, StoreError};
use wasm_bindgen::JsCast;

/// `document.cookie` of the current page.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentCookieJar;

impl DocumentCookieJar {
    fn document() -> Option<web_sys::HtmlDocument> {
        web_sys::window()?
            .document()?
            .dyn_into::<web_sys::HtmlDocument>()
            .ok()
    }
}

impl CookieJar for DocumentCookieJar {
    fn is_available(&self) -> bool {
        Self::document().is_some()
    }

    fn read(&self) -> Option<String> {
        Self::document()?.cookie().ok()
    }

    fn write(&self, assignment: &str) -> Result<(), StoreError> {
        let document = Self::document().ok_or(StoreError::Unavailable)?;
        document
            .set_cookie(assignment)
            .map_err(|e| StoreError::Rejected(format!("{e:?}")))
    }
}

/// Largest numeric suffix among stored keys, e.g. `7` for `L-Comment-7`.
pub fn highest_counter_suffix<'a>(keys: impl IntoIterator<Item = &'a str>) -> u64 {
    keys.into_iter()
        .filter_map(|key| {
            let digits = key.len() - key.trim_end_matches(|c: char| c.is_ascii_digit()).len();
            key[key.len() - digits..].parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0)
}

/// Register a counter that continues after every id already saved in
/// `store`, so a reload does not reuse a stored id.
pub fn init_ids_after_saved(store: &dyn KeyValueStore) {
    let keys = match store.keys() {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!(error = %e, "could not list saved comments");
            Vec::new()
        }
    };
    let last = highest_counter_suffix(keys.iter().map(String::as_str));
    if let Err(e) = init_id_generator(Arc::new(CounterIds::starting_after(last))) {
        tracing::debug!(error = %e, "id generator already set");
    } else {
        tracing::debug!(last, "ids resume after saved comments");
    }
}
