//! Typed access to one key of the storage area.
//!
//! A [`KeyedStore`] never returns an error. A missing key and an unparsable
//! value both read as `None`; failed writes, removals and clears are logged
//! and otherwise ignored. Callers that need to know about failures use
//! [`Storage`] directly.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, trace, warn};

use crate::storage::Storage;

/// A JSON value of type `T` stored under a fixed key.
pub struct KeyedStore<T> {
    storage: Arc<Storage>,
    key: String,
    _value: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for KeyedStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedStore").field("key", &self.key).finish()
    }
}

impl<T> Clone for KeyedStore<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            key: self.key.clone(),
            _value: PhantomData,
        }
    }
}

impl<T> KeyedStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store for `key` in the given storage area.
    #[must_use]
    pub fn new(storage: Arc<Storage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            _value: PhantomData,
        }
    }

    /// The key this store reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The storage area behind this store.
    #[must_use]
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Read and parse the stored value.
    ///
    /// Returns `None` if the key is absent, the value does not parse as `T`,
    /// or the storage area cannot be read.
    #[must_use]
    pub fn get(&self) -> Option<T> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                trace!(key = %self.key, "no stored value");
                return None;
            }
            Err(e) => {
                error!(key = %self.key, "Error getting item from storage: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %self.key, "Discarding unparsable stored value: {e}");
                None
            }
        }
    }

    /// Serialize `value` and replace whatever is stored.
    ///
    /// Returns the serialized form on success so callers can forward it in a
    /// change event; failures are logged and yield `None`.
    pub fn set(&self, value: &T) -> Option<String> {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                error!(key = %self.key, "Error serializing item: {e}");
                return None;
            }
        };

        match self.storage.set_item(&self.key, &raw) {
            Ok(()) => Some(raw),
            Err(e) => {
                error!(key = %self.key, "Error setting item in storage: {e}");
                None
            }
        }
    }

    /// Delete the stored value.
    pub fn remove(&self) {
        if let Err(e) = self.storage.remove_item(&self.key) {
            error!(key = %self.key, "Error removing item from storage: {e}");
        }
    }

    /// Delete **every** key in the storage area, not only this store's.
    pub fn clear(&self) {
        if let Err(e) = self.storage.clear() {
            error!("Error clearing storage: {e}");
        }
    }
}
