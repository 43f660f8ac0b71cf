use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Registry, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global tracing subscriber for the worker process.
///
/// The configured level is the default directive; `RUST_LOG` can still
/// widen or narrow it per target.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    Registry::default()
        .with(filter)
        .with(ErrorLayer::default())
        .with(format_layer(logging.format))
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn format_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    }
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "rifugio_fetch_network_total",
            Unit::Count,
            "GET interceptions served from the network and written through to the cache."
        );
        describe_counter!(
            "rifugio_fetch_uncached_total",
            Unit::Count,
            "Network responses returned without caching because validation failed."
        );
        describe_counter!(
            "rifugio_fetch_cache_fallback_total",
            Unit::Count,
            "Offline requests served from a matching cache entry."
        );
        describe_counter!(
            "rifugio_fetch_offline_page_total",
            Unit::Count,
            "Offline document navigations served the precached fallback page."
        );
        describe_counter!(
            "rifugio_fetch_unavailable_total",
            Unit::Count,
            "Offline requests answered with a synthesized 404."
        );
        describe_counter!(
            "rifugio_fetch_pass_total",
            Unit::Count,
            "Requests passed through without interception."
        );
        describe_gauge!(
            "rifugio_cache_namespaces",
            Unit::Count,
            "Cache namespaces currently present in storage."
        );
    });
}
