//! Network fetch seam.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::domain::{WorkerRequest, WorkerResponse};

/// Errors surfaced by a network fetch attempt.
///
/// During interception any variant triggers the offline fallback chain;
/// none of them reach the requesting client directly.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("network fetch failed: {message}")]
    Network { message: String },
    #[error("request url rejected: {message}")]
    InvalidUrl { message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }
}

/// Upstream fetch interface, implemented over HTTP in production and by
/// scripted fakes in tests.
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    /// Fetch a request for interception or precache population.
    async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse, FetchError>;

    /// Forward a pass-through request unmodified, carrying its original
    /// headers and body. Pass-through responses are never cached.
    async fn forward(
        &self,
        request: &WorkerRequest,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Result<WorkerResponse, FetchError>;
}
