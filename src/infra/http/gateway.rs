//! Catch-all gateway route feeding intercepted requests to the worker.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use tracing::{debug, error};
use url::Url;

use crate::cache::CacheStorage;
use crate::domain::{Destination, WorkerRequest, WorkerResponse};
use crate::worker::{ClientRegistry, EventOutcome, NetworkFetcher, Worker, WorkerEvent};

use super::status;

/// Largest pass-through request body the gateway will buffer.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Headers that must not be replayed on a forwarded request.
const HOP_HEADERS: [&str; 5] = [
    "host",
    "connection",
    "content-length",
    "transfer-encoding",
    "keep-alive",
];

/// Shared state for the gateway router.
#[derive(Clone)]
pub struct GatewayState {
    pub worker: Arc<Worker>,
    pub fetcher: Arc<dyn NetworkFetcher>,
    pub clients: Arc<ClientRegistry>,
    pub storage: Arc<CacheStorage>,
    pub origin: Url,
}

/// Build the gateway router: worker endpoints plus the catch-all
/// interception route.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/_worker/status", get(status::worker_status))
        .route("/_worker/push", post(status::inject_push))
        .fallback(intercept)
        .with_state(state)
}

async fn intercept(State(state): State<GatewayState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let url = match join_origin(&state.origin, &parts.uri) {
        Ok(url) => url,
        Err(reason) => {
            debug!(uri = %parts.uri, reason, "rejecting unroutable request");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let destination = infer_destination(&parts.headers);
    let worker_request = WorkerRequest::new(parts.method.clone(), url).with_destination(destination);

    if destination.is_document() {
        state
            .clients
            .register(state.worker.state().can_intercept_fetch());
    }

    let body = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    match state.worker.dispatch(WorkerEvent::Fetch(worker_request)).await {
        Ok(EventOutcome::Response(response)) => into_http_response(response),
        Ok(EventOutcome::PassThrough(request)) => {
            forward(&state, &parts.headers, request, body).await
        }
        Ok(outcome) => {
            error!(?outcome, "fetch dispatch produced a non-fetch outcome");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(err) => {
            error!(error = %err, "fetch dispatch failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Forward a pass-through request to the network, uncached.
async fn forward(
    state: &GatewayState,
    headers: &HeaderMap,
    request: WorkerRequest,
    body: Bytes,
) -> Response {
    let forwarded: Vec<(String, String)> = headers
        .iter()
        .filter(|(name, _)| !HOP_HEADERS.contains(&name.as_str()))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect();

    match state.fetcher.forward(&request, forwarded, body).await {
        Ok(response) => into_http_response(response),
        Err(err) => {
            debug!(url = %request.url(), error = %err, "pass-through fetch failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

fn join_origin(origin: &Url, uri: &Uri) -> Result<Url, &'static str> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    origin
        .join(path_and_query)
        .map_err(|_| "path does not join against the origin")
}

fn infer_destination(headers: &HeaderMap) -> Destination {
    if let Some(dest) = headers.get("sec-fetch-dest").and_then(|v| v.to_str().ok()) {
        return Destination::from_header(dest);
    }

    let accepts_html = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"));
    if accepts_html {
        Destination::Document
    } else {
        Destination::Other
    }
}

fn into_http_response(response: WorkerResponse) -> Response {
    let (status, headers, bytes) = match response.into_parts() {
        Ok(parts) => parts,
        Err(err) => {
            error!(error = %err, "response body consumed before transport");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut builder = Response::builder().status(status);
    for (name, value) in headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, value);
        }
    }
    builder
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
