//! Service configuration.
//!
//! # Data Flow
//! ```text
//! ServiceConfig::default() (compiled-in constants)
//!     → main.rs (binary always uses defaults)
//!     → observability bootstraps (log path, collector endpoint, resource)
//!     → http server (bind address)
//! ```
//!
//! # Design Decisions
//! - No config file, environment variables or flags; every value is fixed
//! - Tests build a default config and override individual fields

pub mod schema;

pub use schema::ServiceConfig;
pub use schema::ListenerConfig;
pub use schema::LoggingConfig;
pub use schema::TracingConfig;
