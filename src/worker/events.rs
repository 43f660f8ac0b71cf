//! Event dispatch: the worker's host-facing surface.

use std::sync::{Arc, RwLock};

use bytes::Bytes;
use tracing::info;
use url::Url;

use crate::cache::CacheStorage;
use crate::domain::{WorkerRequest, WorkerResponse};

use super::clients::ClientRegistry;
use super::config::WorkerConfig;
use super::error::WorkerError;
use super::fetcher::NetworkFetcher;
use super::interceptor::FetchInterceptor;
use super::lifecycle::LifecycleController;
use super::lock::{rw_read, rw_write};
use super::notifications::{Notification, NotificationHandler};
use super::state::WorkerState;

const SOURCE: &str = "worker::events";

/// Background-sync tag the worker responds to.
const SYNC_TAG: &str = "background-sync";

/// Events delivered to the worker by its host.
#[derive(Debug)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(WorkerRequest),
    Push(Option<Bytes>),
    NotificationClick,
    Sync { tag: String },
}

/// What handling an event produced.
#[derive(Debug)]
pub enum EventOutcome {
    /// Lifecycle or sync work ran to completion.
    Completed,
    /// The interceptor answered the request.
    Response(WorkerResponse),
    /// The request is not intercepted; forward it unmodified.
    PassThrough(WorkerRequest),
    /// Display this notification.
    Notification(Notification),
    /// Dismiss the notification and open this URL in a client window.
    OpenWindow(Url),
    /// The event carried nothing actionable.
    Ignored,
}

/// The offline cache worker.
///
/// Each handler runs to completion before its outcome is returned; the
/// host awaits the returned future fully, which is the in-process
/// equivalent of extending the event's lifetime until the work settles.
pub struct Worker {
    config: WorkerConfig,
    state: RwLock<WorkerState>,
    lifecycle: LifecycleController,
    interceptor: FetchInterceptor,
    notifications: NotificationHandler,
}

impl Worker {
    pub fn new(
        config: WorkerConfig,
        storage: Arc<CacheStorage>,
        fetcher: Arc<dyn NetworkFetcher>,
        clients: Arc<ClientRegistry>,
    ) -> Self {
        let lifecycle = LifecycleController::new(
            config.clone(),
            Arc::clone(&storage),
            Arc::clone(&fetcher),
            clients,
        );
        let interceptor = FetchInterceptor::new(config.clone(), storage, fetcher);
        let notifications = NotificationHandler::new(config.origin.clone());
        Self {
            config,
            state: RwLock::new(WorkerState::Parsed),
            lifecycle,
            interceptor,
            notifications,
        }
    }

    pub fn state(&self) -> WorkerState {
        *rw_read(&self.state, SOURCE, "state")
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    fn set_state(&self, next: WorkerState) {
        *rw_write(&self.state, SOURCE, "set_state") = next;
    }

    /// Route one event to its handler by kind.
    pub async fn dispatch(&self, event: WorkerEvent) -> Result<EventOutcome, WorkerError> {
        match event {
            WorkerEvent::Install => self.on_install().await,
            WorkerEvent::Activate => self.on_activate(),
            WorkerEvent::Fetch(request) => self.on_fetch(request).await,
            WorkerEvent::Push(payload) => Ok(self.on_push(payload)),
            WorkerEvent::NotificationClick => {
                Ok(EventOutcome::OpenWindow(self.notifications.handle_click()))
            }
            WorkerEvent::Sync { tag } => Ok(self.on_sync(&tag)),
        }
    }

    async fn on_install(&self) -> Result<EventOutcome, WorkerError> {
        let state = self.state();
        if state != WorkerState::Parsed {
            return Err(WorkerError::InvalidState {
                expected: "parsed",
                actual: state,
            });
        }

        self.set_state(WorkerState::Installing);
        match self.lifecycle.install().await {
            Ok(()) => {
                // Skip the waiting phase: the worker is immediately
                // eligible to activate.
                self.set_state(WorkerState::Installed);
                Ok(EventOutcome::Completed)
            }
            Err(error) => {
                // Failed installs reset so the host can retry.
                self.set_state(WorkerState::Parsed);
                Err(WorkerError::Install(error))
            }
        }
    }

    fn on_activate(&self) -> Result<EventOutcome, WorkerError> {
        let state = self.state();
        if state != WorkerState::Installed {
            return Err(WorkerError::InvalidState {
                expected: "installed",
                actual: state,
            });
        }

        self.set_state(WorkerState::Activating);
        self.lifecycle.activate();
        self.set_state(WorkerState::Activated);
        Ok(EventOutcome::Completed)
    }

    async fn on_fetch(&self, request: WorkerRequest) -> Result<EventOutcome, WorkerError> {
        if !self.state().can_intercept_fetch() {
            return Ok(EventOutcome::PassThrough(request));
        }
        self.interceptor.intercept(request).await
    }

    fn on_push(&self, payload: Option<Bytes>) -> EventOutcome {
        match self.notifications.handle_push(payload.as_deref()) {
            Some(notification) => EventOutcome::Notification(notification),
            None => EventOutcome::Ignored,
        }
    }

    fn on_sync(&self, tag: &str) -> EventOutcome {
        if tag == SYNC_TAG {
            // No offline write queue exists; the event only logs.
            info!("background sync triggered");
            EventOutcome::Completed
        } else {
            EventOutcome::Ignored
        }
    }
}
