//! PostgreSQL connection lifecycle.

use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use url::Url;

use super::{ConnectionError, DriverError, NotInitializedError, read_slot, replace_slot};
use crate::config::{Configuration, ExecutionMode, redact_url};
use crate::logging::Logger;

/// Parameters handed to a [`DatabaseDriver`] when opening a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Connection URL including credentials.
    pub url: Url,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// Execution mode of the process.
    pub mode: ExecutionMode,
}

impl DatabaseSettings {
    /// Read settings from configuration.
    ///
    /// # Errors
    ///
    /// Propagates the first missing value as [`ConnectionError::Configuration`].
    pub fn from_config(config: &Configuration) -> Result<Self, ConnectionError> {
        Ok(Self {
            url: config.database_url()?.clone(),
            pool_size: config.database_pool_size()?,
            mode: config.execution_mode()?,
        })
    }

    /// URL with credentials removed, suitable for logs.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        redact_url(&self.url)
    }
}

/// Opens and closes database clients.
#[async_trait]
pub trait DatabaseDriver: Send + Sync + 'static {
    /// Shared handle used by repositories, typically a connection pool.
    type Client: Clone + Send + Sync + 'static;

    /// Open a client and verify the database is reachable.
    async fn open(&self, settings: &DatabaseSettings) -> Result<Self::Client, DriverError>;

    /// Release a client.
    async fn close(&self, client: Self::Client) -> Result<(), DriverError>;
}

/// Owns at most one database client.
pub struct DatabaseConnection<D: DatabaseDriver> {
    driver: D,
    config: std::sync::Arc<Configuration>,
    logger: Logger,
    client: RwLock<Option<D::Client>>,
    gate: Mutex<()>,
}

impl<D: DatabaseDriver> DatabaseConnection<D> {
    /// Disconnected connection.
    pub fn new(driver: D, config: std::sync::Arc<Configuration>, logger: Logger) -> Self {
        Self {
            driver,
            config,
            logger,
            client: RwLock::new(None),
            gate: Mutex::new(()),
        }
    }

    /// Whether a client is currently held.
    pub fn is_connected(&self) -> bool {
        read_slot(&self.client).is_some()
    }

    /// Open the client unless already connected.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Configuration`] when settings are missing
    /// and [`ConnectionError::Unreachable`] when the driver fails. The
    /// connection stays disconnected in both cases.
    pub async fn connect(&self) -> Result<(), ConnectionError> {
        let _gate = self.gate.lock().await;
        if self.is_connected() {
            self.logger.debug("Database already connected", None);
            return Ok(());
        }

        let settings = DatabaseSettings::from_config(&self.config).inspect_err(|err| {
            self.logger
                .error_with_cause("Database configuration incomplete", None, err);
        })?;
        let target = settings.redacted_url();
        self.logger.info(
            "Connecting to database",
            Some(&json!({ "target": target, "poolSize": settings.pool_size })),
        );

        match self.driver.open(&settings).await {
            Ok(client) => {
                replace_slot(&self.client, Some(client));
                self.logger
                    .info("Database connected", Some(&json!({ "target": target })));
                Ok(())
            }
            Err(err) => {
                self.logger.error_with_cause(
                    "Failed to connect to database",
                    Some(&json!({ "target": target })),
                    &err,
                );
                Err(ConnectionError::Unreachable {
                    target,
                    message: err.to_string(),
                })
            }
        }
    }

    /// Close the client if one is held.
    ///
    /// Close failures are logged and swallowed; the connection always ends
    /// disconnected.
    pub async fn disconnect(&self) {
        let _gate = self.gate.lock().await;
        let Some(client) = replace_slot(&self.client, None) else {
            self.logger.debug("Database already disconnected", None);
            return;
        };
        match self.driver.close(client).await {
            Ok(()) => self.logger.info("Database disconnected", None),
            Err(err) => {
                self.logger
                    .error_with_cause("Failed to close database connection", None, &err);
            }
        }
    }

    /// Current client.
    ///
    /// # Errors
    ///
    /// Returns [`NotInitializedError`] while disconnected.
    pub fn get_client(&self) -> Result<D::Client, NotInitializedError> {
        read_slot(&self.client).ok_or(NotInitializedError::new("database connection"))
    }
}
