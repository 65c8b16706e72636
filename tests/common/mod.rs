//! Shared utilities for pipeline and server tests.

use std::io;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header::USER_AGENT, Request, StatusCode};
use axum::Router;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

use test_tech::http::{AppState, HttpServer};
use test_tech::observability::{Logger, RequestMetrics};

pub const USER_AGENT_VALUE: &str = "integration-test";

/// In-memory log sink collecting JSON lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

pub struct LogBufferWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferWriter(self.0.clone())
    }
}

impl LogBuffer {
    pub fn records(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Records emitted by request handlers (they carry a `url` field).
    #[allow(dead_code)]
    pub fn request_records(&self) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter(|r| r.get("url").is_some())
            .collect()
    }
}

/// Application state wired to in-memory span and log capture.
pub struct Harness {
    pub state: AppState,
    pub spans: InMemorySpanExporter,
    pub logs: LogBuffer,
    _provider: SdkTracerProvider,
}

impl Harness {
    pub fn new() -> Self {
        let logs = LogBuffer::default();
        let spans = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(spans.clone())
            .build();
        let state = AppState::new(
            Logger::with_writer("test-tech", logs.clone()),
            provider.tracer("test-tech"),
            RequestMetrics::register(),
        );
        Self {
            state,
            spans,
            logs,
            _provider: provider,
        }
    }

    #[allow(dead_code)]
    pub fn router(&self) -> Router {
        HttpServer::build_router(self.state.clone())
    }

    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.spans.get_finished_spans().unwrap()
    }

    /// Current `http_requests_total` as rendered for scraping.
    pub fn counter(&self) -> u64 {
        counter_value(&self.state.metrics.render())
    }
}

/// Parse `http_requests_total <n>` out of a scrape body.
pub fn counter_value(rendered: &str) -> u64 {
    rendered
        .lines()
        .find_map(|line| line.strip_prefix("http_requests_total "))
        .map(|v| v.trim().parse().unwrap())
        .unwrap_or(0)
}

#[allow(dead_code)]
pub fn event_names(span: &SpanData) -> Vec<String> {
    span.events.iter().map(|e| e.name.to_string()).collect()
}

/// Send a request through the router in-process.
#[allow(dead_code)]
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(USER_AGENT, USER_AGENT_VALUE)
        .body(Body::empty())
        .unwrap()
}
