//! Cache namespaces and their stored response snapshots.

use std::sync::Arc;

use axum::http::StatusCode;
use bytes::Bytes;
use dashmap::DashMap;

use crate::domain::{BodyError, ResponseKind, WorkerResponse};

use super::keys::EntryKey;

/// Immutable response snapshot held by a cache namespace.
///
/// Snapshots are only ever replaced whole; key collisions are
/// last-write-wins.
#[derive(Debug, Clone)]
pub struct StoredResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl StoredResponse {
    /// Capture a snapshot by consuming the response body.
    pub fn capture(response: WorkerResponse) -> Result<Self, BodyError> {
        let (status, headers, body) = response.into_parts()?;
        Ok(Self {
            status: status.as_u16(),
            headers,
            body,
        })
    }

    /// Rebuild a servable response from the snapshot.
    ///
    /// Stored entries were validated as same-origin when written, so
    /// the rebuilt response is `Basic`.
    pub fn to_response(&self) -> WorkerResponse {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        WorkerResponse::new(
            status,
            ResponseKind::Basic,
            self.headers.clone(),
            self.body.clone(),
        )
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// One named cache namespace: request identity → response snapshot.
#[derive(Debug, Default)]
pub struct CacheNamespace {
    entries: DashMap<EntryKey, StoredResponse>,
}

impl CacheNamespace {
    fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &EntryKey) -> Option<StoredResponse> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn put(&self, key: EntryKey, snapshot: StoredResponse) {
        self.entries.insert(key, snapshot);
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All namespaces known to the worker, keyed by version name.
#[derive(Debug, Default)]
pub struct CacheStorage {
    namespaces: DashMap<String, Arc<CacheNamespace>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a namespace, creating it if absent.
    pub fn open(&self, name: &str) -> Arc<CacheNamespace> {
        let entry = self
            .namespaces
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CacheNamespace::new()));
        Arc::clone(entry.value())
    }

    pub fn has(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    pub fn delete(&self, name: &str) -> bool {
        self.namespaces.remove(name).is_some()
    }

    /// All namespace names, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.namespaces
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Delete every namespace except `keep`; returns the deleted names.
    pub fn purge_except(&self, keep: &str) -> Vec<String> {
        let stale: Vec<String> = self
            .namespaces
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|name| name != keep)
            .collect();
        for name in &stale {
            self.namespaces.remove(name);
        }
        stale
    }

    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(body: &str) -> StoredResponse {
        StoredResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: Bytes::from(body.to_string()),
        }
    }

    fn key(path: &str) -> EntryKey {
        let origin = url::Url::parse("http://origin.test").expect("valid origin");
        EntryKey::for_path(&origin, path).expect("key")
    }

    #[test]
    fn open_returns_the_same_namespace_for_the_same_name() {
        let storage = CacheStorage::new();
        let first = storage.open("v1");
        let second = storage.open("v1");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn puts_overwrite_instead_of_duplicating() {
        let storage = CacheStorage::new();
        let namespace = storage.open("v1");

        namespace.put(key("/"), snapshot("first"));
        namespace.put(key("/"), snapshot("second"));

        assert_eq!(namespace.len(), 1);
        let cached = namespace.get(&key("/")).expect("entry");
        assert_eq!(cached.body(), &Bytes::from("second"));
    }

    #[test]
    fn purge_except_keeps_only_the_current_namespace() {
        let storage = CacheStorage::new();
        storage.open("v0");
        storage.open("v1");
        storage.open("v2");

        let mut purged = storage.purge_except("v1");
        purged.sort();

        assert_eq!(purged, vec!["v0".to_string(), "v2".to_string()]);
        assert_eq!(storage.names(), vec!["v1".to_string()]);
        assert!(storage.has("v1"));
        assert!(!storage.has("v0"));
    }

    #[test]
    fn snapshot_roundtrips_to_a_basic_response() {
        let rebuilt = snapshot("hello").to_response();
        assert_eq!(rebuilt.status(), StatusCode::OK);
        assert_eq!(rebuilt.kind(), ResponseKind::Basic);
        let (_, headers, body) = rebuilt.into_parts().expect("unread body");
        assert_eq!(headers.len(), 1);
        assert_eq!(body, Bytes::from("hello"));
    }
}
