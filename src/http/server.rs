//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Inject the shared logger, tracer and metrics into handlers
//! - Wire up middleware (tracing)
//! - Serve on a bound listener until it fails or shutdown fires

use axum::{
    routing::{any, get},
    Router,
};
use opentelemetry_sdk::trace::SdkTracer;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::observability::{Logger, RequestMetrics};

/// Application state injected into handlers.
///
/// Built once at startup; handlers only read it.
#[derive(Clone)]
pub struct AppState {
    pub logger: Logger,
    pub tracer: SdkTracer,
    pub metrics: RequestMetrics,
}

impl AppState {
    pub fn new(logger: Logger, tracer: SdkTracer, metrics: RequestMetrics) -> Self {
        Self {
            logger,
            tracer,
            metrics,
        }
    }
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router: `/metrics`, `/hello`, and `/` as the catch-all.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/metrics", get(handlers::metrics))
            .route("/hello", any(handlers::hello))
            .route("/", any(handlers::root))
            .fallback(handlers::root)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns `Ok` once `shutdown` fires and in-flight requests drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
