//! Environment record loading and validation.
//!
//! [`Environment::load`] reads every configuration variable once, validates
//! it against a fixed schema, and returns an immutable typed record. All
//! problems are collected so operators see every bad key in one report.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use super::env_source::EnvSource;

/// PostgreSQL connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// HTTP listening port.
pub const PORT_ENV: &str = "PORT";
/// Execution mode: `development`, `test`, or `production`.
pub const APP_ENV_ENV: &str = "APP_ENV";
/// AMQP broker host name.
pub const RABBITMQ_HOST_ENV: &str = "RABBITMQ_HOST";
/// AMQP broker port.
pub const RABBITMQ_PORT_ENV: &str = "RABBITMQ_PORT";
/// AMQP user name.
pub const RABBITMQ_USERNAME_ENV: &str = "RABBITMQ_USERNAME";
/// AMQP password.
pub const RABBITMQ_PASSWORD_ENV: &str = "RABBITMQ_PASSWORD";
/// Logger threshold: `debug`, `info`, `warn`, or `error`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
/// Maximum number of pooled database connections.
pub const DATABASE_POOL_SIZE_ENV: &str = "DATABASE_POOL_SIZE";
/// Escape hatch that disables validation entirely.
pub const SKIP_ENV_VALIDATION_ENV: &str = "SKIP_ENV_VALIDATION";

const PORT_EXPECTED: &str = "an integer between 1 and 65535";
const POOL_SIZE_EXPECTED: &str = "a positive integer";
const URL_EXPECTED: &str = "an absolute URL";
const APP_ENV_EXPECTED: &str = "development|test|production";
const LOG_LEVEL_EXPECTED: &str = "debug|info|warn|error";
const TEXT_EXPECTED: &str = "a non-empty string";
const REDACTED: &str = "<redacted>";

/// Execution mode of the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Local development.
    #[default]
    Development,
    /// Automated test runs.
    Test,
    /// Production deployment.
    Production,
}

impl ExecutionMode {
    /// Lower-case name used in configuration and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            _ => Err(UnknownVariant),
        }
    }
}

/// Logging threshold, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operational messages.
    #[default]
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures.
    Error,
}

impl LogLevel {
    /// Lower-case name used in configuration and log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(UnknownVariant),
        }
    }
}

/// Parse failure for configuration enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognised value")]
pub struct UnknownVariant;

/// A single problem found while validating the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvIssue {
    /// A required variable is absent or empty.
    #[error("missing required environment variable: {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but malformed.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value, redacted for secrets.
        value: String,
        /// Description of the accepted shape.
        expected: &'static str,
    },
}

impl EnvIssue {
    /// Name of the variable this issue refers to.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Missing { name } | Self::Invalid { name, .. } => name,
        }
    }
}

/// Validation failure listing every offending variable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid environment: {}", render_issues(.issues))]
pub struct ConfigValidationError {
    issues: Vec<EnvIssue>,
}

impl ConfigValidationError {
    /// Individual problems, in schema order.
    #[must_use]
    pub fn issues(&self) -> &[EnvIssue] {
        &self.issues
    }

    /// Whether the given variable contributed to the failure.
    #[must_use]
    pub fn mentions(&self, name: &str) -> bool {
        self.issues.iter().any(|issue| issue.name() == name)
    }
}

fn render_issues(issues: &[EnvIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Immutable, validated configuration record.
///
/// Fields are optional only because the validation escape hatch may leave
/// them absent; a validated record always carries every required value.
#[derive(Clone, PartialEq, Eq)]
pub struct Environment {
    database_url: Option<Url>,
    port: Option<u16>,
    execution_mode: Option<ExecutionMode>,
    broker_host: Option<String>,
    broker_port: Option<u16>,
    broker_username: Option<String>,
    broker_password: Option<String>,
    log_level: Option<LogLevel>,
    database_pool_size: Option<u32>,
    validation_skipped: bool,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("database_url", &self.database_url.as_ref().map(redact_url))
            .field("port", &self.port)
            .field("execution_mode", &self.execution_mode)
            .field("broker_host", &self.broker_host)
            .field("broker_port", &self.broker_port)
            .field("broker_username", &self.broker_username)
            .field("broker_password", &self.broker_password.as_ref().map(|_| REDACTED))
            .field("log_level", &self.log_level)
            .field("database_pool_size", &self.database_pool_size)
            .field("validation_skipped", &self.validation_skipped)
            .finish()
    }
}

impl Environment {
    /// Load and validate the environment.
    ///
    /// `APP_ENV` defaults to `development`, `LOG_LEVEL` to `info`; every
    /// other variable except `DATABASE_POOL_SIZE` is required. Empty values
    /// count as absent. When `SKIP_ENV_VALIDATION` is set, loading never
    /// fails: missing or unparsable values are left absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError`] listing every missing or malformed
    /// variable when validation is active.
    ///
    /// # Examples
    ///
    /// ```
    /// use recipe_backend::config::{EnvSource, Environment, LogLevel};
    ///
    /// struct SkipOnly;
    ///
    /// impl EnvSource for SkipOnly {
    ///     fn string(&self, name: &str) -> Option<String> {
    ///         (name == "SKIP_ENV_VALIDATION").then(|| "1".to_owned())
    ///     }
    /// }
    ///
    /// let env = SkipOnly;
    /// let environment = Environment::load(&env).expect("validation skipped");
    /// assert!(environment.validation_skipped());
    /// assert_eq!(environment.log_level(), Some(LogLevel::Info));
    /// assert!(environment.database_url().is_none());
    /// ```
    pub fn load(env: &impl EnvSource) -> Result<Self, ConfigValidationError> {
        let validation_skipped = env
            .string(SKIP_ENV_VALIDATION_ENV)
            .is_some_and(|value| is_truthy(&value));
        let mut reader = Reader {
            env,
            issues: Vec::new(),
        };

        let environment = Self {
            database_url: reader.required(DATABASE_URL_ENV, URL_EXPECTED, Secrecy::Secret, parse_url),
            port: reader.required(PORT_ENV, PORT_EXPECTED, Secrecy::Public, parse_port),
            execution_mode: Some(
                reader
                    .optional(APP_ENV_ENV, APP_ENV_EXPECTED, Secrecy::Public, |v| v.parse().ok())
                    .unwrap_or_default(),
            ),
            broker_host: reader.required(RABBITMQ_HOST_ENV, TEXT_EXPECTED, Secrecy::Public, parse_text),
            broker_port: reader.required(RABBITMQ_PORT_ENV, PORT_EXPECTED, Secrecy::Public, parse_port),
            broker_username: reader.required(
                RABBITMQ_USERNAME_ENV,
                TEXT_EXPECTED,
                Secrecy::Public,
                parse_text,
            ),
            broker_password: reader.required(
                RABBITMQ_PASSWORD_ENV,
                TEXT_EXPECTED,
                Secrecy::Secret,
                parse_text,
            ),
            log_level: Some(
                reader
                    .optional(LOG_LEVEL_ENV, LOG_LEVEL_EXPECTED, Secrecy::Public, |v| v.parse().ok())
                    .unwrap_or_default(),
            ),
            database_pool_size: reader.optional(
                DATABASE_POOL_SIZE_ENV,
                POOL_SIZE_EXPECTED,
                Secrecy::Public,
                parse_pool_size,
            ),
            validation_skipped,
        };

        if validation_skipped || reader.issues.is_empty() {
            Ok(environment)
        } else {
            Err(ConfigValidationError {
                issues: reader.issues,
            })
        }
    }

    /// PostgreSQL connection URL.
    #[must_use]
    pub fn database_url(&self) -> Option<&Url> {
        self.database_url.as_ref()
    }

    /// HTTP listening port.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Execution mode.
    #[must_use]
    pub fn execution_mode(&self) -> Option<ExecutionMode> {
        self.execution_mode
    }

    /// Broker host name.
    #[must_use]
    pub fn broker_host(&self) -> Option<&str> {
        self.broker_host.as_deref()
    }

    /// Broker port.
    #[must_use]
    pub fn broker_port(&self) -> Option<u16> {
        self.broker_port
    }

    /// Broker user name.
    #[must_use]
    pub fn broker_username(&self) -> Option<&str> {
        self.broker_username.as_deref()
    }

    /// Broker password.
    #[must_use]
    pub fn broker_password(&self) -> Option<&str> {
        self.broker_password.as_deref()
    }

    /// Logger threshold.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Maximum pooled database connections, when configured.
    #[must_use]
    pub fn database_pool_size(&self) -> Option<u32> {
        self.database_pool_size
    }

    /// Whether the record was produced with validation disabled.
    #[must_use]
    pub fn validation_skipped(&self) -> bool {
        self.validation_skipped
    }
}

/// Strip credentials from a URL so it can be logged.
///
/// # Examples
///
/// ```
/// use recipe_backend::config::redact_url;
/// use url::Url;
///
/// let url = Url::parse("postgres://app:hunter2@db:5432/recipes").expect("valid url");
/// assert_eq!(redact_url(&url), "postgres://db:5432/recipes");
/// ```
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    // Both setters only fail for cannot-be-a-base URLs, which carry no credentials.
    redacted.set_password(None).unwrap_or_default();
    redacted.set_username("").unwrap_or_default();
    redacted.to_string()
}

#[derive(Clone, Copy)]
enum Secrecy {
    Public,
    Secret,
}

struct Reader<'a, E> {
    env: &'a E,
    issues: Vec<EnvIssue>,
}

impl<E: EnvSource> Reader<'_, E> {
    fn raw(&self, name: &str) -> Option<String> {
        self.env
            .string(name)
            .filter(|value| !value.trim().is_empty())
    }

    fn required<T>(
        &mut self,
        name: &'static str,
        expected: &'static str,
        secrecy: Secrecy,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        if self.raw(name).is_none() {
            self.issues.push(EnvIssue::Missing { name });
            return None;
        }
        self.optional(name, expected, secrecy, parse)
    }

    fn optional<T>(
        &mut self,
        name: &'static str,
        expected: &'static str,
        secrecy: Secrecy,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let value = self.raw(name)?;
        let parsed = parse(value.trim());
        if parsed.is_none() {
            let value = match secrecy {
                Secrecy::Public => value,
                Secrecy::Secret => REDACTED.to_owned(),
            };
            self.issues.push(EnvIssue::Invalid {
                name,
                value,
                expected,
            });
        }
        parsed
    }
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    !(value.is_empty() || matches!(value.as_str(), "0" | "false" | "no" | "n"))
}

fn parse_url(value: &str) -> Option<Url> {
    Url::parse(value).ok().filter(|url| url.has_host())
}

fn parse_port(value: &str) -> Option<u16> {
    value.parse::<u16>().ok().filter(|port| *port > 0)
}

fn parse_pool_size(value: &str) -> Option<u32> {
    value.parse::<u32>().ok().filter(|size| *size > 0)
}

fn parse_text(value: &str) -> Option<String> {
    Some(value.to_owned())
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
