//! HTTP service wiring logs, traces and metrics together per request.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServiceConfig;
pub use error::ServiceError;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
