//! Lifecycle-managed handles to external systems.
//!
//! A connection owns at most one client opened through a driver trait:
//! [`DatabaseDriver`] for PostgreSQL and [`BrokerDriver`] for the AMQP broker.
//! Connect and disconnect are serialized per connection; the current state is
//! readable without awaiting.

mod broker;
mod database;

use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use crate::config::MissingConfigError;

pub use broker::{BrokerConnection, BrokerDriver, BrokerState, BrokerTarget};
pub use database::{DatabaseConnection, DatabaseDriver, DatabaseSettings};

/// Failure establishing or using a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// A required configuration value was absent.
    #[error(transparent)]
    Configuration(#[from] MissingConfigError),
    /// Connection parameters could not be assembled into a target address.
    #[error("invalid connection target: {message}")]
    InvalidTarget {
        /// Description of the problem.
        message: String,
    },
    /// The external system could not be reached.
    #[error("failed to connect to {target}: {message}")]
    Unreachable {
        /// Target address with credentials removed.
        target: String,
        /// Driver-reported reason.
        message: String,
    },
    /// A broker channel could not be opened.
    #[error("failed to open broker channel: {message}")]
    Channel {
        /// Driver-reported reason.
        message: String,
    },
    /// The connection has not been established.
    #[error(transparent)]
    NotInitialized(#[from] NotInitializedError),
}

/// Returned when a component is used before it was initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{component} is not initialized")]
pub struct NotInitializedError {
    /// Human-readable component name.
    pub component: &'static str,
}

impl NotInitializedError {
    /// Error naming `component`.
    #[must_use]
    pub const fn new(component: &'static str) -> Self {
        Self { component }
    }
}

/// Failure reported by a driver implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DriverError {
    message: String,
}

impl DriverError {
    /// Error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Driver-reported reason.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub(crate) fn read_slot<T: Clone>(slot: &RwLock<T>) -> T {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

pub(crate) fn replace_slot<T>(slot: &RwLock<T>, value: T) -> T {
    let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *guard, value)
}
