//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routing, TraceLayer)
//!     → handlers.rs (per-request span, counter, logger, validation)
//!     → request.rs (method / URL / user agent, query parameters)
//!     → plain text response
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::RequestFields;
pub use server::{AppState, HttpServer};
