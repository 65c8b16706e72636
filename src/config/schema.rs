//! Configuration schema definitions.
//!
//! All values default to the constants the service runs with.

use std::path::PathBuf;

/// Name reported by logs, the trace resource and the tracer.
pub const SERVICE_NAME: &str = "test-tech";

/// Root configuration for the service.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Structured log sink settings.
    pub logging: LoggingConfig,

    /// Trace export settings.
    pub tracing: TracingConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Logger bootstrap settings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Append-only JSON lines file.
    pub path: PathBuf,

    /// Value of the constant `service` field on every record.
    pub service_name: String,

    /// `EnvFilter` directives for the console layer.
    pub console_directives: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./logs/app.log"),
            service_name: SERVICE_NAME.to_string(),
            console_directives: "test_tech=info,tower_http=debug".to_string(),
        }
    }
}

/// Tracer bootstrap settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Collector hostname.
    pub collector_host: String,

    /// Collector OTLP/HTTP port.
    pub collector_port: u16,

    /// `service.name` resource attribute.
    pub service_name: String,

    /// `deployment.environment` resource attribute.
    pub deployment_environment: String,

    /// Instrumentation scope name for request spans.
    pub tracer_name: String,
}

impl TracingConfig {
    /// OTLP/HTTP traces endpoint over plain HTTP.
    pub fn endpoint(&self) -> String {
        format!(
            "http://{}:{}/v1/traces",
            self.collector_host, self.collector_port
        )
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            collector_host: "jaeger".to_string(),
            collector_port: 4318,
            service_name: SERVICE_NAME.to_string(),
            deployment_environment: "local".to_string(),
            tracer_name: SERVICE_NAME.to_string(),
        }
    }
}
