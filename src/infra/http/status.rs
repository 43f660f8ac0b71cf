//! Worker status and push-injection endpoints.

use axum::{Json, extract::State, http::StatusCode};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};

use crate::worker::{EventOutcome, WorkerEvent};

use super::gateway::GatewayState;

/// JSON snapshot of the worker served at `/_worker/status`.
#[derive(Debug, Serialize)]
pub struct WorkerStatus {
    pub state: String,
    pub cache_version: String,
    pub clients: usize,
    pub controlled_clients: usize,
    pub namespaces: Vec<NamespaceStatus>,
}

#[derive(Debug, Serialize)]
pub struct NamespaceStatus {
    pub name: String,
    pub entries: usize,
}

pub(super) async fn worker_status(State(state): State<GatewayState>) -> Json<WorkerStatus> {
    let mut namespaces: Vec<NamespaceStatus> = state
        .storage
        .names()
        .into_iter()
        .map(|name| {
            let entries = state.storage.open(&name).len();
            NamespaceStatus { name, entries }
        })
        .collect();
    namespaces.sort_by(|a, b| a.name.cmp(&b.name));

    Json(WorkerStatus {
        state: state.worker.state().to_string(),
        cache_version: state.worker.config().cache_version.clone(),
        clients: state.clients.client_count(),
        controlled_clients: state.clients.controlled_count(),
        namespaces,
    })
}

/// Accepts a push payload and dispatches it as a push event.
///
/// Always answers 204 for handled events: malformed payloads are
/// ignored, matching the worker's push semantics.
pub(super) async fn inject_push(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    let payload = (!body.is_empty()).then_some(body);

    match state.worker.dispatch(WorkerEvent::Push(payload)).await {
        Ok(EventOutcome::Notification(notification)) => {
            info!(title = %notification.title, "displaying notification");
            StatusCode::NO_CONTENT
        }
        Ok(_) => StatusCode::NO_CONTENT,
        Err(err) => {
            error!(error = %err, "push dispatch failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
