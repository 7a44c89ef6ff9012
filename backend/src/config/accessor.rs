//! Typed read access to the validated environment.

use std::fmt;

use thiserror::Error;
use url::Url;

use super::environment::{
    APP_ENV_ENV, DATABASE_POOL_SIZE_ENV, DATABASE_URL_ENV, Environment, ExecutionMode, LOG_LEVEL_ENV,
    LogLevel, PORT_ENV, RABBITMQ_HOST_ENV, RABBITMQ_PASSWORD_ENV, RABBITMQ_PORT_ENV,
    RABBITMQ_USERNAME_ENV,
};

/// Pool size used when `DATABASE_POOL_SIZE` is not configured.
pub const DEFAULT_DATABASE_POOL_SIZE: u32 = 10;

/// Keys of the environment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// `DATABASE_URL`.
    DatabaseUrl,
    /// `PORT`.
    Port,
    /// `APP_ENV`.
    ExecutionMode,
    /// `RABBITMQ_HOST`.
    BrokerHost,
    /// `RABBITMQ_PORT`.
    BrokerPort,
    /// `RABBITMQ_USERNAME`.
    BrokerUsername,
    /// `RABBITMQ_PASSWORD`.
    BrokerPassword,
    /// `LOG_LEVEL`.
    LogLevel,
    /// `DATABASE_POOL_SIZE`.
    DatabasePoolSize,
}

impl ConfigKey {
    /// Every key, in schema order.
    pub const ALL: [Self; 9] = [
        Self::DatabaseUrl,
        Self::Port,
        Self::ExecutionMode,
        Self::BrokerHost,
        Self::BrokerPort,
        Self::BrokerUsername,
        Self::BrokerPassword,
        Self::LogLevel,
        Self::DatabasePoolSize,
    ];

    /// Environment variable backing this key.
    #[must_use]
    pub const fn env_name(self) -> &'static str {
        match self {
            Self::DatabaseUrl => DATABASE_URL_ENV,
            Self::Port => PORT_ENV,
            Self::ExecutionMode => APP_ENV_ENV,
            Self::BrokerHost => RABBITMQ_HOST_ENV,
            Self::BrokerPort => RABBITMQ_PORT_ENV,
            Self::BrokerUsername => RABBITMQ_USERNAME_ENV,
            Self::BrokerPassword => RABBITMQ_PASSWORD_ENV,
            Self::LogLevel => LOG_LEVEL_ENV,
            Self::DatabasePoolSize => DATABASE_POOL_SIZE_ENV,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_name())
    }
}

/// A value stored under a [`ConfigKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// Free text such as host names and credentials.
    Text(String),
    /// A parsed URL.
    Url(Url),
    /// A positive integer such as a port or pool size.
    Number(u32),
    /// Execution mode.
    Mode(ExecutionMode),
    /// Logging threshold.
    Level(LogLevel),
}

/// Raised when a key has no stored value and no default was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("configuration value missing for {key}")]
pub struct MissingConfigError {
    /// The key that was requested.
    pub key: ConfigKey,
}

/// Read-only view over a loaded [`Environment`].
#[derive(Debug, Clone)]
pub struct Configuration {
    environment: Environment,
}

impl Configuration {
    /// Wrap a loaded environment record.
    #[must_use]
    pub fn new(environment: Environment) -> Self {
        Self { environment }
    }

    /// The underlying record.
    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Look up a key, falling back to `default` when the value is absent.
    ///
    /// # Errors
    ///
    /// Returns [`MissingConfigError`] when neither a stored value nor a
    /// default exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use recipe_backend::config::{
    ///     ConfigKey, ConfigValue, Configuration, EnvSource, Environment,
    /// };
    ///
    /// struct SkipOnly;
    ///
    /// impl EnvSource for SkipOnly {
    ///     fn string(&self, name: &str) -> Option<String> {
    ///         (name == "SKIP_ENV_VALIDATION").then(|| "1".to_owned())
    ///     }
    /// }
    ///
    /// let config = Configuration::new(Environment::load(&SkipOnly).expect("validation skipped"));
    ///
    /// assert!(config.get(ConfigKey::Port, None).is_err());
    /// assert_eq!(
    ///     config.get(ConfigKey::Port, Some(ConfigValue::Number(3000))),
    ///     Ok(ConfigValue::Number(3000))
    /// );
    /// ```
    pub fn get(
        &self,
        key: ConfigKey,
        default: Option<ConfigValue>,
    ) -> Result<ConfigValue, MissingConfigError> {
        self.stored(key)
            .or(default)
            .ok_or(MissingConfigError { key })
    }

    fn stored(&self, key: ConfigKey) -> Option<ConfigValue> {
        let env = &self.environment;
        match key {
            ConfigKey::DatabaseUrl => env.database_url().cloned().map(ConfigValue::Url),
            ConfigKey::Port => env.port().map(|port| ConfigValue::Number(port.into())),
            ConfigKey::ExecutionMode => env.execution_mode().map(ConfigValue::Mode),
            ConfigKey::BrokerHost => text(env.broker_host()),
            ConfigKey::BrokerPort => env.broker_port().map(|port| ConfigValue::Number(port.into())),
            ConfigKey::BrokerUsername => text(env.broker_username()),
            ConfigKey::BrokerPassword => text(env.broker_password()),
            ConfigKey::LogLevel => env.log_level().map(ConfigValue::Level),
            ConfigKey::DatabasePoolSize => env.database_pool_size().map(ConfigValue::Number),
        }
    }

    /// PostgreSQL connection URL.
    pub fn database_url(&self) -> Result<&Url, MissingConfigError> {
        require(ConfigKey::DatabaseUrl, self.environment.database_url())
    }

    /// HTTP listening port.
    pub fn port(&self) -> Result<u16, MissingConfigError> {
        require(ConfigKey::Port, self.environment.port())
    }

    /// HTTP listening port, or `default` when unset.
    #[must_use]
    pub fn port_or(&self, default: u16) -> u16 {
        self.port().unwrap_or(default)
    }

    /// Execution mode.
    pub fn execution_mode(&self) -> Result<ExecutionMode, MissingConfigError> {
        require(ConfigKey::ExecutionMode, self.environment.execution_mode())
    }

    /// Logging threshold.
    pub fn log_level(&self) -> Result<LogLevel, MissingConfigError> {
        require(ConfigKey::LogLevel, self.environment.log_level())
    }

    /// Broker host name.
    pub fn broker_host(&self) -> Result<&str, MissingConfigError> {
        require(ConfigKey::BrokerHost, self.environment.broker_host())
    }

    /// Broker port.
    pub fn broker_port(&self) -> Result<u16, MissingConfigError> {
        require(ConfigKey::BrokerPort, self.environment.broker_port())
    }

    /// Broker user name.
    pub fn broker_username(&self) -> Result<&str, MissingConfigError> {
        require(ConfigKey::BrokerUsername, self.environment.broker_username())
    }

    /// Broker password.
    pub fn broker_password(&self) -> Result<&str, MissingConfigError> {
        require(ConfigKey::BrokerPassword, self.environment.broker_password())
    }

    /// Maximum pooled database connections.
    ///
    /// Falls back to [`DEFAULT_DATABASE_POOL_SIZE`].
    pub fn database_pool_size(&self) -> Result<u32, MissingConfigError> {
        Ok(self
            .environment
            .database_pool_size()
            .unwrap_or(DEFAULT_DATABASE_POOL_SIZE))
    }

    /// Whether the record was loaded with validation disabled.
    #[must_use]
    pub fn validation_skipped(&self) -> bool {
        self.environment.validation_skipped()
    }
}

fn require<T>(key: ConfigKey, value: Option<T>) -> Result<T, MissingConfigError> {
    value.ok_or(MissingConfigError { key })
}

fn text(value: Option<&str>) -> Option<ConfigValue> {
    value.map(|value| ConfigValue::Text(value.to_owned()))
}
