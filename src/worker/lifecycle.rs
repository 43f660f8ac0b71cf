//! Install/activate lifecycle control.

use std::sync::Arc;

use axum::http::Method;
use metrics::gauge;
use tracing::{debug, info};

use crate::cache::{CacheStorage, EntryKey, StoredResponse};
use crate::domain::WorkerRequest;

use super::clients::ClientRegistry;
use super::config::WorkerConfig;
use super::error::InstallError;
use super::fetcher::NetworkFetcher;

const METRIC_NAMESPACES: &str = "rifugio_cache_namespaces";

/// What an activation did: which stale namespaces were purged and how
/// many clients were claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub purged: Vec<String>,
    pub claimed_clients: usize,
}

/// Drives the worker through its install and activate phases.
pub struct LifecycleController {
    config: WorkerConfig,
    storage: Arc<CacheStorage>,
    fetcher: Arc<dyn NetworkFetcher>,
    clients: Arc<ClientRegistry>,
}

impl LifecycleController {
    pub fn new(
        config: WorkerConfig,
        storage: Arc<CacheStorage>,
        fetcher: Arc<dyn NetworkFetcher>,
        clients: Arc<ClientRegistry>,
    ) -> Self {
        Self {
            config,
            storage,
            fetcher,
            clients,
        }
    }

    /// Populate the versioned namespace with the precache set.
    ///
    /// All-or-nothing: every snapshot is staged before anything is
    /// written, so a failed fetch leaves no partial namespace content.
    /// Re-running a successful install overwrites the same keys and is
    /// safe.
    pub async fn install(&self) -> Result<(), InstallError> {
        let mut staged = Vec::with_capacity(self.config.precache.len());
        let mut total_bytes = 0usize;

        for path in &self.config.precache {
            let url = self
                .config
                .origin
                .join(path)
                .map_err(|err| InstallError::invalid_path(path, err.to_string()))?;
            let request = WorkerRequest::new(Method::GET, url);

            let response =
                self.fetcher
                    .fetch(&request)
                    .await
                    .map_err(|source| InstallError::Fetch {
                        path: path.clone(),
                        source,
                    })?;

            if !response.is_storable() {
                return Err(InstallError::NotStorable {
                    path: path.clone(),
                    status: response.status().as_u16(),
                });
            }

            let key = EntryKey::for_request(&request);
            let snapshot =
                StoredResponse::capture(response).map_err(|source| InstallError::Snapshot {
                    path: path.clone(),
                    source,
                })?;

            total_bytes += snapshot.body().len();
            staged.push((key, snapshot));
        }

        let namespace = self.storage.open(&self.config.cache_version);
        let entry_count = staged.len();
        for (key, snapshot) in staged {
            namespace.put(key, snapshot);
        }

        gauge!(METRIC_NAMESPACES).set(self.storage.namespace_count() as f64);
        info!(
            version = %self.config.cache_version,
            entries = entry_count,
            bytes = total_bytes,
            "precache populated"
        );
        Ok(())
    }

    /// Purge every stale namespace and claim all open clients.
    pub fn activate(&self) -> ActivationReport {
        self.storage.open(&self.config.cache_version);
        let purged = self.storage.purge_except(&self.config.cache_version);
        for name in &purged {
            debug!(namespace = %name, "deleted stale cache namespace");
        }

        let claimed_clients = self.clients.claim_all();

        gauge!(METRIC_NAMESPACES).set(self.storage.namespace_count() as f64);
        info!(
            version = %self.config.cache_version,
            purged = purged.len(),
            claimed = claimed_clients,
            "worker activated"
        );

        ActivationReport {
            purged,
            claimed_clients,
        }
    }
}
