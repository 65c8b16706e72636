//! test-tech: an HTTP service wiring logs, traces and metrics per request.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                    test-tech                      │
//!                    │                                                   │
//!   GET / , /hello   │  ┌─────────┐    ┌──────────┐    ┌─────────────┐  │
//!   ─────────────────┼─▶│  axum   │───▶│ handlers │───▶│  response   │──┼──▶ client
//!                    │  │ :8080   │    │ pipeline │    │ plain text  │  │
//!                    │  └─────────┘    └────┬─────┘    └─────────────┘  │
//!                    │                      │                            │
//!                    │       ┌──────────────┼──────────────┐             │
//!                    │       ▼              ▼              ▼             │
//!                    │  ┌─────────┐   ┌──────────┐   ┌──────────┐        │
//!                    │  │  span   │   │ counter  │   │ JSON log │        │
//!                    │  │ (OTLP)  │   │ (metrics)│   │  record  │        │
//!                    │  └────┬────┘   └────┬─────┘   └────┬─────┘        │
//!                    └───────┼─────────────┼──────────────┼──────────────┘
//!                            ▼             ▼              ▼
//!                     jaeger:4318     GET /metrics   ./logs/app.log
//! ```
//!
//! Telemetry is built before the async runtime and torn down after it, so
//! the blocking OTLP HTTP client never runs on a runtime thread.

use std::process::ExitCode;

use test_tech::config::ServiceConfig;
use test_tech::http::AppState;
use test_tech::lifecycle::{signals, startup, Shutdown};
use test_tech::observability::tracing::init_tracer;
use test_tech::observability::{RequestMetrics, TracerGuard};

fn main() -> ExitCode {
    let config = ServiceConfig::default();

    let logger = match startup::init_logger(&config.logging) {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("test-tech: {err}");
            return ExitCode::FAILURE;
        }
    };

    let tracer = match init_tracer(&config.tracing) {
        Ok(provider) => TracerGuard::new(provider),
        Err(err) => {
            tracing::error!(error = %err, "Failed to create trace provider");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(
        logger,
        tracer.tracer(&config.tracing.tracer_name),
        RequestMetrics::register(),
    );

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "Failed to build runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        let shutdown = Shutdown::new();
        tokio::spawn(signals::shutdown_on_ctrl_c(shutdown.clone()));
        startup::serve(&config.listener, state, &shutdown).await
    });
    drop(runtime);

    // `tracer` drops after this, flushing remaining spans.
    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Server stopped");
            ExitCode::FAILURE
        }
    }
}
