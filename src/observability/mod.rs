//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     → logging.rs (JSON lines file sink + console, base Logger)
//!     → tracing.rs (OTLP/HTTP exporter, batching provider, propagator)
//!     → metrics.rs (http_requests_total registry)
//!
//! Per request (http/handlers.rs):
//!     RequestSpan → counter +1 → RequestLogger → one log record → response
//!
//! Consumers:
//!     → ./logs/app.log (one JSON object per line)
//!     → /metrics (Prometheus scrape)
//!     → Collector at jaeger:4318 (OTLP/HTTP)
//! ```
//!
//! # Design Decisions
//! - Logger, tracer and metrics are built once and injected into handlers
//! - Span end and provider shutdown are tied to destructors

pub mod logging;
pub mod metrics;
pub mod tracing;

pub use self::logging::{Logger, RequestLogger};
pub use self::metrics::RequestMetrics;
pub use self::tracing::{RequestSpan, TracerGuard};
