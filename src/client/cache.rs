// src/client/cache.rs

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::client::{api::ApiClient, error::ClientResult};

/// Cache key derived from a request path: `/api/orders/42/tracking` becomes
/// `["api", "orders", "42", "tracking"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn from_path(path: &str) -> Self {
        Self::new(path.split('/').filter(|segment| !segment.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

/// Server responses by key. Entries never go stale on their own; mutations
/// call `invalidate` for the keys they affect.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub fn set(&self, key: QueryKey, value: Value) {
        self.entries.write().insert(key, value);
    }

    /// Drops every entry whose key starts with `prefix`. Returns how many went.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let dropped = before - entries.len();
        if dropped > 0 {
            tracing::debug!(prefix = ?prefix.segments(), dropped, "query cache invalidated");
        }
        dropped
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get_as<T: DeserializeOwned>(&self, key: &QueryKey) -> ClientResult<Option<T>> {
        self.get(key)
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    pub fn set_as<T: Serialize>(&self, key: QueryKey, value: &T) -> ClientResult<()> {
        self.set(key, serde_json::to_value(value)?);
        Ok(())
    }

    /// Cached `GET`: the first call hits the API, later calls reuse the stored
    /// answer until the key is invalidated.
    pub async fn fetch<T: DeserializeOwned>(&self, api: &ApiClient, path: &str) -> ClientResult<T> {
        let key = QueryKey::from_path(path);
        if let Some(hit) = self.get_as(&key)? {
            return Ok(hit);
        }

        let value: Value = api.get(path).await?;
        let decoded = serde_json::from_value(value.clone())?;
        self.set(key, value);
        Ok(decoded)
    }
}
