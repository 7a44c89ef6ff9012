//! Structured, level-filtered JSON-line logging.
//!
//! [`Logger`] is the application-facing logger handed to services and
//! connections. Each accepted call writes exactly one JSON object per line to
//! the diagnostic stream. Adapter internals keep using `tracing` macros; call
//! [`Logger::install_tracing`] once at startup so those events share the same
//! threshold and JSON format.

use std::error::Error as StdError;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{Configuration, LogLevel};

/// Cheaply cloneable structured logger with a fixed threshold.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    threshold: LogLevel,
    writer: BoxMakeWriter,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.inner.threshold)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Logger writing to standard error.
    #[must_use]
    pub fn new(threshold: LogLevel) -> Self {
        Self::with_writer(threshold, BoxMakeWriter::new(std::io::stderr))
    }

    /// Logger writing through an arbitrary writer factory.
    #[must_use]
    pub fn with_writer(threshold: LogLevel, writer: BoxMakeWriter) -> Self {
        Self {
            inner: Arc::new(LoggerInner { threshold, writer }),
        }
    }

    /// Logger whose threshold is read once from configuration.
    ///
    /// Falls back to `info` when the level is absent.
    #[must_use]
    pub fn from_config(config: &Configuration) -> Self {
        Self::new(config.log_level().unwrap_or_default())
    }

    /// Active threshold.
    #[must_use]
    pub fn threshold(&self) -> LogLevel {
        self.inner.threshold
    }

    /// Whether a call at `level` would be written.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.inner.threshold
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str, metadata: Option<&Value>) {
        self.emit(LogLevel::Debug, message, metadata, None);
    }

    /// Log at info level.
    pub fn info(&self, message: &str, metadata: Option<&Value>) {
        self.emit(LogLevel::Info, message, metadata, None);
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str, metadata: Option<&Value>) {
        self.emit(LogLevel::Warn, message, metadata, None);
    }

    /// Log at error level without an attached error value.
    pub fn error(&self, message: &str, metadata: Option<&Value>) {
        self.emit(LogLevel::Error, message, metadata, None);
    }

    /// Log at error level, attaching `cause` as a nested `error` object.
    ///
    /// # Examples
    ///
    /// ```
    /// use recipe_backend::config::LogLevel;
    /// use recipe_backend::logging::Logger;
    /// use serde_json::json;
    ///
    /// let logger = Logger::new(LogLevel::Error);
    /// let cause = std::io::Error::other("connection refused");
    /// logger.error_with_cause("Failed to connect", Some(&json!({"target": "db"})), &cause);
    /// ```
    pub fn error_with_cause<E>(&self, message: &str, metadata: Option<&Value>, cause: &E)
    where
        E: StdError + ?Sized,
    {
        let error = describe_error(short_type_name::<E>(), cause);
        self.emit(LogLevel::Error, message, metadata, Some(error));
    }

    /// Install the process-wide `tracing` subscriber at this threshold.
    ///
    /// `RUST_LOG` directives, when present, refine the filter.
    ///
    /// # Errors
    ///
    /// Fails when a global subscriber is already installed.
    pub fn install_tracing(&self) -> Result<(), Box<dyn StdError + Send + Sync + 'static>> {
        let filter = EnvFilter::builder()
            .with_default_directive(level_filter(self.inner.threshold).into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    }

    fn emit(&self, level: LogLevel, message: &str, metadata: Option<&Value>, error: Option<Value>) {
        if !self.enabled(level) {
            return;
        }
        let record = build_record(level, message, metadata, error);
        let mut writer = self.inner.writer.make_writer();
        // Logging must never fail the caller.
        let _ = writeln!(writer, "{record}");
    }
}

fn build_record(
    level: LogLevel,
    message: &str,
    metadata: Option<&Value>,
    error: Option<Value>,
) -> Value {
    let mut record = Map::new();
    record.insert(
        "timestamp".into(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    match metadata {
        None | Some(Value::Null) => {}
        Some(Value::Object(fields)) => {
            for (key, value) in fields {
                record.insert(key.clone(), value.clone());
            }
        }
        Some(other) => {
            record.insert("metadata".into(), other.clone());
        }
    }
    record.insert("level".into(), Value::String(level.as_str().to_owned()));
    record.insert("message".into(), Value::String(message.to_owned()));
    if let Some(error) = error {
        record.insert("error".into(), error);
    }
    Value::Object(record)
}

fn describe_error<E>(name: &str, error: &E) -> Value
where
    E: StdError + ?Sized,
{
    let mut stack = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        stack.push(Value::String(cause.to_string()));
        source = cause.source();
    }
    json!({
        "name": name,
        "message": error.to_string(),
        "stack": stack,
    })
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::LogBuffer;
    use rstest::rstest;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("pool exhausted")]
    struct Inner;

    #[derive(Debug, Error)]
    #[error("database unreachable")]
    struct Outer(#[source] Inner);

    fn logger(threshold: LogLevel) -> (Logger, LogBuffer) {
        let buffer = LogBuffer::default();
        (Logger::with_writer(threshold, buffer.make_writer()), buffer)
    }

    #[rstest]
    #[case(LogLevel::Debug, 4)]
    #[case(LogLevel::Info, 3)]
    #[case(LogLevel::Warn, 2)]
    #[case(LogLevel::Error, 1)]
    fn threshold_filters_lower_levels(#[case] threshold: LogLevel, #[case] expected: usize) {
        let (logger, buffer) = logger(threshold);
        logger.debug("d", None);
        logger.info("i", None);
        logger.warn("w", None);
        logger.error("e", None);
        assert_eq!(buffer.lines().len(), expected);
    }

    #[rstest]
    fn warn_is_suppressed_at_error_threshold() {
        let (logger, buffer) = logger(LogLevel::Error);
        logger.warn("x", None);
        assert!(buffer.lines().is_empty());
    }

    #[rstest]
    fn object_metadata_is_merged_at_top_level() {
        let (logger, buffer) = logger(LogLevel::Debug);
        logger.info(
            "Recipe created",
            Some(&json!({"recipeId": "abc", "level": "debug", "message": "spoofed"})),
        );

        let lines = buffer.lines();
        let [line] = lines.as_slice() else {
            panic!("expected exactly one line, got {lines:?}");
        };
        assert_eq!(line["recipeId"], "abc");
        assert_eq!(line["level"], "info");
        assert_eq!(line["message"], "Recipe created");
        assert!(line["timestamp"].is_string());
    }

    #[rstest]
    fn scalar_metadata_is_nested() {
        let (logger, buffer) = logger(LogLevel::Debug);
        logger.debug("value", Some(&json!(42)));
        assert_eq!(buffer.lines()[0]["metadata"], 42);
    }

    #[rstest]
    fn error_cause_is_described_with_source_chain() {
        let (logger, buffer) = logger(LogLevel::Info);
        logger.error_with_cause("Failed to connect", None, &Outer(Inner));

        let line = &buffer.lines()[0];
        assert_eq!(line["level"], "error");
        assert_eq!(line["error"]["name"], "Outer");
        assert_eq!(line["error"]["message"], "database unreachable");
        assert_eq!(line["error"]["stack"], json!(["pool exhausted"]));
    }

    #[rstest]
    fn clones_share_threshold_and_writer() {
        let (logger, buffer) = logger(LogLevel::Warn);
        let clone = logger.clone();
        clone.warn("from clone", None);
        logger.info("dropped", None);
        assert_eq!(buffer.lines().len(), 1);
        assert_eq!(clone.threshold(), LogLevel::Warn);
    }
}
