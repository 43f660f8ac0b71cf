//! Infrastructure: upstream HTTP client, gateway server, telemetry.

pub mod error;
pub mod http;
pub mod net;
pub mod telemetry;
