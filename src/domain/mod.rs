//! Core request/response types shared by the cache and the worker.

mod error;
mod request;
mod response;

pub use error::BodyError;
pub use request::{Destination, WorkerRequest};
pub use response::{ResponseBody, ResponseKind, WorkerResponse};
