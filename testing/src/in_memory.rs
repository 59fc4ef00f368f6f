//! In-memory document store for fast, deterministic tests.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for lock access

use clientdesk_core::store::{Collection, Document, Filter, StoreError, StoreFuture};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

/// `HashMap`-backed [`Collection`].
///
/// Documents are held in serialized form so that filters and guards see the
/// same JSON the `PostgreSQL` store would. Clones share storage.
#[derive(Debug)]
pub struct InMemoryCollection<T> {
    data: Arc<RwLock<HashMap<String, Value>>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for InMemoryCollection<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for InMemoryCollection<T> {
    fn default() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> InMemoryCollection<T> {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every document, decoded.
    #[must_use]
    pub fn all(&self) -> Vec<T> {
        self.data
            .read()
            .unwrap()
            .values()
            .filter_map(|v| serde_json::from_value(v.clone()).ok())
            .collect()
    }

    fn encode(document: &T) -> Result<Value, StoreError> {
        serde_json::to_value(document).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(value: &Value) -> Result<T, StoreError> {
        serde_json::from_value(value.clone()).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl<T: Document> Collection<T> for InMemoryCollection<T> {
    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<T>> {
        Box::pin(async move {
            let data = self.data.read().unwrap();
            data.get(id).map(Self::decode).transpose()
        })
    }

    fn find<'a>(&'a self, filter: &'a Filter) -> StoreFuture<'a, Vec<T>> {
        Box::pin(async move {
            let data = self.data.read().unwrap();
            data.values()
                .filter(|v| filter.matches(v))
                .map(Self::decode)
                .collect()
        })
    }

    fn insert<'a>(&'a self, document: &'a T) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let value = Self::encode(document)?;
            let mut data = self.data.write().unwrap();
            if data.contains_key(document.id()) {
                return Err(StoreError::Conflict {
                    collection: T::COLLECTION,
                    id: document.id().to_string(),
                });
            }
            data.insert(document.id().to_string(), value);
            Ok(())
        })
    }

    fn replace<'a>(&'a self, document: &'a T) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let value = Self::encode(document)?;
            let mut data = self.data.write().unwrap();
            match data.get_mut(document.id()) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(StoreError::NotFound {
                    collection: T::COLLECTION,
                    id: document.id().to_string(),
                }),
            }
        })
    }

    fn replace_if<'a>(&'a self, document: &'a T, guard: &'a Filter) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let value = Self::encode(document)?;
            let mut data = self.data.write().unwrap();
            match data.get_mut(document.id()) {
                Some(slot) if guard.matches(slot) => {
                    *slot = value;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move { Ok(self.data.write().unwrap().remove(id).is_some()) })
    }
}
