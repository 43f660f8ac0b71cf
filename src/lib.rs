//! Rifugio: an offline cache worker for web clients.
//!
//! The worker sits between a browser-facing listener and an origin
//! site. It precaches a fixed set of resources into a versioned cache
//! namespace at install time, purges stale namespaces at activation,
//! and answers intercepted GET requests network-first with the cache as
//! an offline safety net. Push payloads are turned into local
//! notification descriptions.
//!
//! Layers:
//!
//! - [`domain`]: request/response types, including the
//!   duplicate-before-consume body contract.
//! - [`cache`]: versioned namespace storage.
//! - [`worker`]: lifecycle controller, fetch interceptor, notification
//!   handler, and the event dispatch surface tying them together.
//! - [`infra`]: upstream HTTP fetcher, gateway router, telemetry.
//! - [`config`]: layered settings (file → environment → CLI).

pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod worker;
