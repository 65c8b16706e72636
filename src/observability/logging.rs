//! Structured logging.
//!
//! # Responsibilities
//! - Open the append-only JSON lines sink
//! - Stamp every record with `@timestamp`, `level`, `service` and `msg`
//! - Derive request-scoped loggers without touching the base logger
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging; the base logger is a `Dispatch`
//! - Request fields live on a span, so records inside it inherit them
//! - Info and above reach the file; the console layer mirrors it for humans

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Dispatch, Event, Level, Span, Subscriber};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::{Result, ServiceError};

/// Process-wide base logger.
///
/// Cloning is cheap and shares the same sink.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Open the configured log file (creating it and its directory if absent)
    /// and build a logger writing JSON lines to it, plus a console layer.
    pub fn open(config: &LoggingConfig) -> Result<Self> {
        let log_file_error = |source| ServiceError::LogFile {
            path: config.path.clone(),
            source,
        };

        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(log_file_error)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .map_err(log_file_error)?;

        let console = tracing_subscriber::fmt::layer()
            .with_filter(EnvFilter::new(&config.console_directives));

        let subscriber = tracing_subscriber::registry()
            .with(json_layer(&config.service_name, Mutex::new(file)))
            .with(console);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
        })
    }

    /// Build a logger writing JSON lines to an arbitrary writer.
    pub fn with_writer<W>(service_name: &str, make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let subscriber = tracing_subscriber::registry().with(json_layer(service_name, make_writer));
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Install this logger as the global default for code that does not
    /// receive it explicitly (startup messages, library logs).
    pub fn install_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())?;
        Ok(())
    }

    /// Run `f` with this logger as the current default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Derive a logger carrying the request's method, URL and user agent.
    pub fn request(&self, method: &str, url: &str, user_agent: &str) -> RequestLogger {
        let span = self.in_scope(|| {
            tracing::info_span!("request", method = method, url = url, userAgent = user_agent)
        });
        RequestLogger {
            dispatch: self.dispatch.clone(),
            span,
        }
    }
}

/// A base logger plus one request's fields.
///
/// Records emitted through [`RequestLogger::in_scope`] carry the fields;
/// the base logger's other records do not.
pub struct RequestLogger {
    dispatch: Dispatch,
    span: Span,
}

impl RequestLogger {
    /// Run `f` with the request fields attached to every record it emits.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, || self.span.in_scope(f))
    }
}

fn json_layer<S, W>(service_name: &str, make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    JsonLines {
        service: service_name.to_string(),
        make_writer,
    }
    .with_filter(file_filter())
}

/// Info and above, without the exporter's own diagnostics.
fn file_filter() -> Targets {
    Targets::new()
        .with_default(LevelFilter::INFO)
        .with_target("opentelemetry", LevelFilter::OFF)
        .with_target("opentelemetry_sdk", LevelFilter::OFF)
        .with_target("opentelemetry_otlp", LevelFilter::OFF)
}

/// One serialized record.
#[derive(Serialize)]
struct LogRecord<'a> {
    #[serde(rename = "@timestamp")]
    timestamp: String,
    level: &'static str,
    service: &'a str,
    msg: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// Field values collected from a span or event.
#[derive(Debug, Default)]
struct JsonFields(Map<String, Value>);

impl JsonFields {
    fn insert(&mut self, field: &Field, value: Value) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for JsonFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

/// Layer writing each event as a single JSON line.
struct JsonLines<W> {
    service: String,
    make_writer: W,
}

impl<S, W> Layer<S> for JsonLines<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = JsonFields::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(fields);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(fields) = extensions.get_mut::<JsonFields>() {
            values.record(fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = JsonFields::default();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(span_fields) = span.extensions().get::<JsonFields>() {
                    fields.0.extend(span_fields.0.clone());
                }
            }
        }
        event.record(&mut fields);

        let msg = match fields.0.remove("message") {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let record = LogRecord {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level: level_name(event.metadata().level()),
            service: &self.service,
            msg,
            fields: fields.0,
        };

        let Ok(mut line) = serde_json::to_vec(&record) else {
            return;
        };
        line.push(b'\n');

        // Single write per record keeps concurrent lines whole.
        let mut writer = self.make_writer.make_writer_for(event.metadata());
        let _ = writer.write_all(&line);
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        Level::DEBUG => "debug",
        Level::TRACE => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    struct BufferWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for BufferWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = BufferWriter;

        fn make_writer(&'a self) -> Self::Writer {
            BufferWriter(self.0.clone())
        }
    }

    impl Buffer {
        fn records(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap();
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    #[test]
    fn test_record_carries_service_and_timestamp() {
        let buffer = Buffer::default();
        let logger = Logger::with_writer("test-tech", buffer.clone());

        logger.in_scope(|| tracing::info!("Listening server on :8080"));

        let records = buffer.records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["level"], "info");
        assert_eq!(record["service"], "test-tech");
        assert_eq!(record["msg"], "Listening server on :8080");
        let ts = record["@timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'), "timestamp should be UTC: {ts}");
    }

    #[test]
    fn test_below_info_is_dropped() {
        let buffer = Buffer::default();
        let logger = Logger::with_writer("test-tech", buffer.clone());

        logger.in_scope(|| {
            tracing::debug!("hidden");
            tracing::trace!("hidden");
            tracing::warn!("kept");
            tracing::error!("kept");
        });

        let levels: Vec<_> = buffer
            .records()
            .iter()
            .map(|r| r["level"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(levels, vec!["warn", "error"]);
    }

    #[test]
    fn test_request_logger_does_not_mutate_base() {
        let buffer = Buffer::default();
        let logger = Logger::with_writer("test-tech", buffer.clone());

        let log = logger.request("GET", "/hello?name=ana", "curl/8.0");
        log.in_scope(|| tracing::info!(name = "ana", "Received request"));
        logger.in_scope(|| tracing::info!("unrelated"));

        let records = buffer.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["method"], "GET");
        assert_eq!(records[0]["url"], "/hello?name=ana");
        assert_eq!(records[0]["userAgent"], "curl/8.0");
        assert_eq!(records[0]["name"], "ana");
        assert_eq!(records[0]["service"], "test-tech");
        assert!(records[1].get("method").is_none());
        assert!(records[1].get("url").is_none());
    }

    #[test]
    fn test_events_outside_logger_are_not_captured() {
        let buffer = Buffer::default();
        let _logger = Logger::with_writer("test-tech", buffer.clone());

        tracing::info!("goes to whatever the thread default is");

        assert!(buffer.records().is_empty());
    }

    #[test]
    fn test_open_creates_directory_and_appends() {
        let dir = std::env::temp_dir().join(format!("test-tech-logs-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let config = LoggingConfig {
            path: dir.join("nested").join("app.log"),
            ..LoggingConfig::default()
        };

        Logger::open(&config)
            .unwrap()
            .in_scope(|| tracing::info!("first"));
        Logger::open(&config)
            .unwrap()
            .in_scope(|| tracing::error!("second"));

        let content = fs::read_to_string(&config.path).unwrap();
        let records: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["msg"], "first");
        assert_eq!(records[1]["msg"], "second");
        assert_eq!(records[1]["level"], "error");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_open_fails_when_path_is_a_directory() {
        let dir = std::env::temp_dir().join(format!("test-tech-dir-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let config = LoggingConfig {
            path: dir.clone(),
            ..LoggingConfig::default()
        };

        let err = Logger::open(&config).err().unwrap();
        assert!(matches!(err, ServiceError::LogFile { .. }));

        let _ = fs::remove_dir_all(&dir);
    }
}
