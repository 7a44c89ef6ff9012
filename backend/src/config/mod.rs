//! Process configuration: environment validation and typed access.

mod accessor;
mod env_source;
mod environment;

pub use accessor::{
    ConfigKey, ConfigValue, Configuration, DEFAULT_DATABASE_POOL_SIZE, MissingConfigError,
};
pub use env_source::{EnvSource, ProcessEnv};
pub use environment::{
    APP_ENV_ENV, ConfigValidationError, DATABASE_POOL_SIZE_ENV, DATABASE_URL_ENV, EnvIssue,
    Environment, ExecutionMode, LOG_LEVEL_ENV, LogLevel, PORT_ENV, RABBITMQ_HOST_ENV,
    RABBITMQ_PASSWORD_ENV, RABBITMQ_PORT_ENV, RABBITMQ_USERNAME_ENV, SKIP_ENV_VALIDATION_ENV,
    UnknownVariant, redact_url,
};
