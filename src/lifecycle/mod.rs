//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Open logger → Build tracer → Register metrics → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain requests → Flush spans → Exit
//!
//! Signals (signals.rs):
//!     Ctrl+C → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when telemetry is ready)
//! - Listener failure exits non-zero; trace flush still runs on the way out

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
