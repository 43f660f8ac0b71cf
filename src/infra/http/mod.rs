//! Gateway HTTP surface.

mod gateway;
mod status;

pub use gateway::{GatewayState, build_router};
pub use status::{NamespaceStatus, WorkerStatus};
