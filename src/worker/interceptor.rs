//! Network-first fetch interception.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use metrics::counter;
use tracing::debug;

use crate::cache::{CacheStorage, EntryKey, StoredResponse};
use crate::domain::{WorkerRequest, WorkerResponse};

use super::config::WorkerConfig;
use super::error::WorkerError;
use super::events::EventOutcome;
use super::fetcher::NetworkFetcher;

const METRIC_NETWORK: &str = "rifugio_fetch_network_total";
const METRIC_UNCACHED: &str = "rifugio_fetch_uncached_total";
const METRIC_CACHE_FALLBACK: &str = "rifugio_fetch_cache_fallback_total";
const METRIC_OFFLINE_PAGE: &str = "rifugio_fetch_offline_page_total";
const METRIC_UNAVAILABLE: &str = "rifugio_fetch_unavailable_total";
const METRIC_PASS: &str = "rifugio_fetch_pass_total";

/// Body of the synthesized response for offline sub-resources.
pub const OFFLINE_BODY: &str = "Resource not available offline";

/// Applies the network-first policy to intercepted requests.
///
/// The cache is an offline safety net, not a performance cache: the
/// network is always tried first and a cached entry is only consulted
/// when it fails.
pub struct FetchInterceptor {
    config: WorkerConfig,
    storage: Arc<CacheStorage>,
    fetcher: Arc<dyn NetworkFetcher>,
}

impl FetchInterceptor {
    pub fn new(
        config: WorkerConfig,
        storage: Arc<CacheStorage>,
        fetcher: Arc<dyn NetworkFetcher>,
    ) -> Self {
        Self {
            config,
            storage,
            fetcher,
        }
    }

    /// Decide how to answer one intercepted request.
    ///
    /// Network errors never reach the caller: fetch failures fall back
    /// to the cache, then to the offline page (documents) or a
    /// synthesized 404 (anything else).
    pub async fn intercept(&self, request: WorkerRequest) -> Result<EventOutcome, WorkerError> {
        if request.method() != Method::GET {
            counter!(METRIC_PASS).increment(1);
            return Ok(EventOutcome::PassThrough(request));
        }

        if self.config.is_excluded(request.url()) {
            counter!(METRIC_PASS).increment(1);
            debug!(url = %request.url(), "request excluded from caching");
            return Ok(EventOutcome::PassThrough(request));
        }

        match self.fetcher.fetch(&request).await {
            Ok(response) => self.store_and_return(&request, response),
            Err(error) => {
                debug!(
                    url = %request.url(),
                    error = %error,
                    "network fetch failed, consulting cache"
                );
                Ok(EventOutcome::Response(self.offline_response(&request)))
            }
        }
    }

    fn store_and_return(
        &self,
        request: &WorkerRequest,
        response: WorkerResponse,
    ) -> Result<EventOutcome, WorkerError> {
        if !response.is_storable() {
            counter!(METRIC_UNCACHED).increment(1);
            debug!(
                url = %request.url(),
                status = response.status().as_u16(),
                "returning response uncached"
            );
            return Ok(EventOutcome::Response(response));
        }

        // The body stream is consumed exactly once downstream, so a
        // usable copy must be taken before the original is returned.
        let copy = response.duplicate()?;
        let snapshot = StoredResponse::capture(copy)?;
        let namespace = self.storage.open(&self.config.cache_version);
        namespace.put(EntryKey::for_request(request), snapshot);

        counter!(METRIC_NETWORK).increment(1);
        Ok(EventOutcome::Response(response))
    }

    fn offline_response(&self, request: &WorkerRequest) -> WorkerResponse {
        let namespace = self.storage.open(&self.config.cache_version);

        if let Some(snapshot) = namespace.get(&EntryKey::for_request(request)) {
            counter!(METRIC_CACHE_FALLBACK).increment(1);
            return snapshot.to_response();
        }

        if request.destination().is_document()
            && let Ok(key) = EntryKey::for_path(&self.config.origin, &self.config.offline_path)
            && let Some(snapshot) = namespace.get(&key)
        {
            counter!(METRIC_OFFLINE_PAGE).increment(1);
            return snapshot.to_response();
        }

        counter!(METRIC_UNAVAILABLE).increment(1);
        WorkerResponse::synthetic(StatusCode::NOT_FOUND, OFFLINE_BODY)
    }
}
