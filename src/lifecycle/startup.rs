//! Startup orchestration.
//!
//! # Responsibilities
//! - Open and install the process-wide logger
//! - Bind the listener and hand it to the HTTP server
//!
//! Tracer construction lives in `observability::tracing::init_tracer`; the
//! binary calls it between these two steps so a failure can be logged.

use tokio::net::TcpListener;

use crate::config::{ListenerConfig, LoggingConfig};
use crate::error::{Result, ServiceError};
use crate::http::{AppState, HttpServer};
use crate::lifecycle::Shutdown;
use crate::observability::Logger;

/// Open the log sink and install it as the global default.
pub fn init_logger(config: &LoggingConfig) -> Result<Logger> {
    let logger = Logger::open(config)?;
    logger.install_global()?;
    Ok(logger)
}

/// Bind `config.bind_address` and serve until the listener fails or
/// `shutdown` fires.
pub async fn serve(config: &ListenerConfig, state: AppState, shutdown: &Shutdown) -> Result<()> {
    let listener = TcpListener::bind(&config.bind_address)
        .await
        .map_err(|source| ServiceError::Bind {
            address: config.bind_address.clone(),
            source,
        })?;

    let logger = state.logger.clone();
    logger.in_scope(|| tracing::info!("Listening server on {}", config.bind_address));

    HttpServer::new(state)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(ServiceError::Serve)
}
