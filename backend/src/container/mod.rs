//! Lazily built, process-lifetime containers.
//!
//! Initialization order: environment, configuration, logger, database,
//! broker, repositories, event publisher, services.

mod connections;
mod context;
mod infrastructure;
mod services;

use thiserror::Error;

use crate::config::ConfigValidationError;
use crate::connections::{ConnectionError, NotInitializedError};

pub use connections::ConnectionsContainer;
pub use context::{AppContext, ConnectionsOf};
pub use infrastructure::Infrastructure;
pub use services::ServicesContainer;

/// Failure building the services container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// The environment failed validation.
    #[error(transparent)]
    Config(#[from] ConfigValidationError),
    /// A connection could not be established.
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    /// A connection was not available after connecting.
    #[error(transparent)]
    NotInitialized(#[from] NotInitializedError),
}
