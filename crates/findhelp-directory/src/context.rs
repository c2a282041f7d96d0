//! The last search, persisted so a back-navigation can reopen it.

use findhelp_core::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};

use crate::query::{SearchLocation, SearchQuery};

pub const CONTEXT_KEY: &str = "search.context";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchContext {
    pub term: String,
    #[serde(default)]
    pub is_subcategory: bool,
    pub location: SearchLocation,
}

impl From<&SearchQuery> for SearchContext {
    fn from(query: &SearchQuery) -> Self {
        Self {
            term: query.text.clone(),
            is_subcategory: query.is_subcategory,
            location: query.location.clone(),
        }
    }
}

impl SearchContext {
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if the context cannot be serialized, or
    /// the store's error if it rejects the write.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let json = serde_json::to_string(self).map_err(|source| StoreError::Encode {
            key: CONTEXT_KEY.to_string(),
            source,
        })?;
        store.set(CONTEXT_KEY, &json)
    }

    /// The saved context, or `None` if nothing was saved. An unreadable
    /// value is logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store itself cannot be read.
    pub fn load(store: &dyn KeyValueStore) -> Result<Option<Self>, StoreError> {
        let Some(raw) = store.get(CONTEXT_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(context) => Ok(Some(context)),
            Err(e) => {
                tracing::warn!(key = CONTEXT_KEY, error = %e, "ignoring unreadable search context");
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the removal cannot be written.
    pub fn clear(store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.remove(CONTEXT_KEY)
    }
}
