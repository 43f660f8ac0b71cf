//! The offline cache worker.
//!
//! Lifecycle control (install/activate), network-first fetch
//! interception and notification handling, driven through an event
//! dispatch surface keyed by event kind. Configuration is injected at
//! construction; nothing here reads global state.

mod clients;
mod config;
mod error;
mod events;
mod fetcher;
mod interceptor;
mod lifecycle;
mod lock;
mod notifications;
mod state;

pub use clients::ClientRegistry;
pub use config::WorkerConfig;
pub use error::{InstallError, WorkerError};
pub use events::{EventOutcome, Worker, WorkerEvent};
pub use fetcher::{FetchError, NetworkFetcher};
pub use interceptor::{FetchInterceptor, OFFLINE_BODY};
pub use lifecycle::{ActivationReport, LifecycleController};
pub use notifications::{Notification, NotificationData, NotificationHandler};
pub use state::WorkerState;
