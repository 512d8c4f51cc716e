use axum::{body::Body, http::Request};
use mediadrop_core::LogFormat;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::middleware::RequestId;

const DEFAULT_FILTER: &str = "mediadrop_api=debug,mediadrop_storage=debug,tower_http=debug";

/// Initialize tracing: `RUST_LOG` filter, compact console lines or JSON.
///
/// Safe to call more than once; later calls leave the first subscriber in
/// place.
pub fn init_telemetry(format: LogFormat) -> Result<(), anyhow::Error> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let result = match format {
        LogFormat::Compact => {
            let console_fmt = tracing_subscriber::fmt::layer()
                .event_format(Format::default().compact().with_target(false));
            tracing_subscriber::registry()
                .with(filter())
                .with(console_fmt)
                .try_init()
        }
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter())
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    match result {
        Ok(()) => {
            tracing::info!(format = %format, "Tracing initialized");
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Tracing subscriber already installed");
            Ok(())
        }
    }
}

/// Per-request span carrying method, path, and request id.
pub fn http_trace_layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    impl Fn(&Request<Body>) -> tracing::Span + Clone,
> {
    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    })
}
