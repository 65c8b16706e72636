//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Register the request counter
//! - Render the registry in the Prometheus text format for `/metrics`
//!
//! # Metrics
//! - `http_requests_total` (counter): requests to `/` and `/hello`, including
//!   failed validations
//!
//! # Design Decisions
//! - Each [`RequestMetrics`] owns its own recorder; nothing is installed globally
//! - Counter updates are atomic increments shared by every handler

use metrics::{Counter, Key, KeyName, Level, Metadata, Recorder, SharedString};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Name of the request counter.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

const HTTP_REQUESTS_TOTAL_HELP: &str = "A counter for requests to the wrapped handler.";

/// Request counter plus the handle that renders it.
#[derive(Clone)]
pub struct RequestMetrics {
    requests_total: Counter,
    handle: PrometheusHandle,
}

impl RequestMetrics {
    /// Build a registry and register `http_requests_total` into it.
    pub fn register() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();

        recorder.describe_counter(
            KeyName::from_const_str(HTTP_REQUESTS_TOTAL),
            None,
            SharedString::from(HTTP_REQUESTS_TOTAL_HELP),
        );
        let metadata = Metadata::new(module_path!(), Level::INFO, Some(module_path!()));
        let requests_total =
            recorder.register_counter(&Key::from_static_name(HTTP_REQUESTS_TOTAL), &metadata);

        Self {
            requests_total,
            handle: recorder.handle(),
        }
    }

    /// Count one request.
    pub fn record_request(&self) {
        self.requests_total.increment(1);
    }

    /// Current registry in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}
