//! Upstream HTTP fetcher.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::domain::{ResponseKind, WorkerRequest, WorkerResponse};
use crate::worker::{FetchError, NetworkFetcher};

use super::error::InfraError;

/// Fetches upstream resources over HTTP with a shared client.
///
/// Responses whose final URL shares the configured origin classify as
/// `Basic`; everything else (including cross-origin redirects) is
/// `Cors` and will not be cached by the interceptor.
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: Url,
}

impl HttpFetcher {
    pub fn new(origin: Url) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self { client, origin })
    }

    fn classify(&self, final_url: &Url) -> ResponseKind {
        if same_origin(&self.origin, final_url) {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        }
    }

    async fn convert(&self, response: reqwest::Response) -> Result<WorkerResponse, FetchError> {
        let status = response.status();
        let final_url = response.url().clone();
        let headers = collect_headers(response.headers());
        let bytes = response
            .bytes()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        Ok(WorkerResponse::new(
            status,
            self.classify(&final_url),
            headers,
            bytes,
        ))
    }
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect()
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse, FetchError> {
        let response = self
            .client
            .request(request.method().clone(), request.url().clone())
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        self.convert(response).await
    }

    async fn forward(
        &self,
        request: &WorkerRequest,
        headers: Vec<(String, String)>,
        body: Bytes,
    ) -> Result<WorkerResponse, FetchError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url().clone());
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if !body.is_empty() {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| FetchError::network(err.to_string()))?;
        self.convert(response).await
    }
}
