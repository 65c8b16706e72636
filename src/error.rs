//! Error types for service startup and the serve loop.
//!
//! Every variant is fatal: the binary logs it and exits with status 1.
//! Per-request failures never become a `ServiceError`.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal startup or runtime error.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The log file could not be opened for appending.
    #[error("failed to open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The process-wide logger could not be installed.
    #[error("failed to install logger: {0}")]
    SetLogger(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// The OTLP span exporter could not be constructed.
    #[error("failed to create trace provider: {0}")]
    TraceExporter(#[from] opentelemetry_otlp::ExporterBuildError),

    /// The listener could not bind its address.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The listener failed while serving.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Result alias for fallible startup steps.
pub type Result<T> = std::result::Result<T, ServiceError>;
