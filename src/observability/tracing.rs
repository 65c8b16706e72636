//! Distributed tracing support.
//!
//! # Responsibilities
//! - Build the OTLP/HTTP exporter and batching trace provider
//! - Register W3C Trace Context propagation process-wide
//! - Extract trace context from incoming requests
//! - Create one span per request and end it on every exit path
//!
//! # Design Decisions
//! - The provider is installed globally and also handed to callers, who pass
//!   a tracer into request handlers explicitly
//! - Span end is tied to `Drop`, so early returns and panics still close it
//! - Provider shutdown is tied to `Drop` of [`TracerGuard`]

use axum::http::HeaderMap;
use opentelemetry::global;
use opentelemetry::propagation::Extractor;
use opentelemetry::trace::{Span as _, Tracer as _, TracerProvider as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider, Span};
use opentelemetry_sdk::Resource;

use crate::config::TracingConfig;
use crate::error::Result;

/// Build the exporter and trace provider, register the propagator and
/// install the provider as the global default.
pub fn init_tracer(config: &TracingConfig) -> Result<SdkTracerProvider> {
    let endpoint = config.endpoint();
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint.clone())
        .build()?;

    global::set_text_map_propagator(TraceContextPropagator::new());

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource(config))
        .build();

    global::set_tracer_provider(provider.clone());

    tracing::info!(endpoint = %endpoint, "Trace provider initialized");
    Ok(provider)
}

/// Resource describing this service.
pub fn resource(config: &TracingConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .with_attribute(KeyValue::new(
            "deployment.environment",
            config.deployment_environment.clone(),
        ))
        .build()
}

/// Owns the trace provider for the life of the process.
///
/// Dropping it flushes buffered spans and shuts the exporter down.
pub struct TracerGuard {
    provider: SdkTracerProvider,
}

impl TracerGuard {
    pub fn new(provider: SdkTracerProvider) -> Self {
        Self { provider }
    }

    /// Tracer for request spans.
    pub fn tracer(&self, name: &str) -> SdkTracer {
        self.provider.tracer(name.to_string())
    }
}

impl Drop for TracerGuard {
    fn drop(&mut self) {
        if let Err(err) = self.provider.shutdown() {
            tracing::warn!(error = %err, "Trace provider shutdown failed");
        }
    }
}

/// Span covering one request.
///
/// Ends when dropped.
pub struct RequestSpan {
    span: Span,
}

impl RequestSpan {
    /// Start a span named `name`, parented to the trace context carried by
    /// `headers` (if any).
    pub fn start(tracer: &SdkTracer, name: &'static str, headers: &HeaderMap) -> Self {
        let parent = extract_context(headers);
        Self {
            span: tracer.start_with_context(name, &parent),
        }
    }

    /// Append a named event.
    pub fn event(&mut self, name: &'static str) {
        self.span.add_event(name, Vec::new());
    }
}

impl Drop for RequestSpan {
    fn drop(&mut self) {
        self.span.end();
    }
}

/// Extract the remote parent context using the global propagator.
pub fn extract_context(headers: &HeaderMap) -> Context {
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
