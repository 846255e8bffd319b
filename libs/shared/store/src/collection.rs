use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::local::{LocalStore, StoreError};

/// Typed whole-collection view over one store key.
///
/// Every mutation above this layer loads the full list, rebuilds it in
/// memory and calls [`Collection::save_all`] with the complete result.
pub struct Collection<T> {
    store: Arc<LocalStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<LocalStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    /// Load the collection, `None` when the key has never been written.
    pub fn try_load(&self) -> Result<Option<Vec<T>>, StoreError> {
        match self.store.get(self.key)? {
            Some(raw) => {
                let items = serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                    key: self.key.to_string(),
                    source,
                })?;
                Ok(Some(items))
            }
            None => Ok(None),
        }
    }

    /// Load the collection, writing and returning `seed` on first access.
    pub fn load_or_seed(&self, seed: impl FnOnce() -> Vec<T>) -> Result<Vec<T>, StoreError> {
        match self.try_load()? {
            Some(items) => Ok(items),
            None => {
                let items = seed();
                self.save_all(&items)?;
                Ok(items)
            }
        }
    }

    /// Overwrite the entire collection.
    pub fn save_all(&self, items: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(items).map_err(|source| StoreError::Encode {
            key: self.key.to_string(),
            source,
        })?;
        self.store.put(self.key, &raw)
    }
}

/// Singleton-record counterpart of [`Collection`], for keys holding a
/// single document (clinic profile, current session).
pub struct Record<T> {
    store: Arc<LocalStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Record<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<LocalStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    pub fn load(&self) -> Result<Option<T>, StoreError> {
        match self.store.get(self.key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                    key: self.key.to_string(),
                    source,
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn load_or_seed(&self, seed: impl FnOnce() -> T) -> Result<T, StoreError> {
        match self.load()? {
            Some(value) => Ok(value),
            None => {
                let value = seed();
                self.save(&value)?;
                Ok(value)
            }
        }
    }

    pub fn save(&self, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: self.key.to_string(),
            source,
        })?;
        self.store.put(self.key, &raw)
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(self.key)
    }
}
