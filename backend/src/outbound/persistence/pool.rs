//! Async connection pool for Diesel PostgreSQL connections.
//!
//! Wraps `diesel-async` and `bb8`. Checkout is non-blocking and bounded by
//! the configured timeout; failures surface as [`PoolError`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::connections::DatabaseSettings;

const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },

    /// A checked-out connection did not answer.
    #[error("database did not answer: {message}")]
    Probe { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn probe(message: impl Into<String>) -> Self {
        Self::Probe {
            message: message.into(),
        }
    }

    /// Underlying driver message.
    pub fn message(&self) -> &str {
        match self {
            Self::Checkout { message } | Self::Build { message } | Self::Probe { message } => {
                message
            }
        }
    }
}

/// Configuration for the database connection pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use recipe_backend::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://app@localhost/recipes")
///     .with_max_size(20)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_size(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Configuration with ten connections and a 30 second checkout timeout.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }

    /// Configuration for validated database settings.
    pub fn from_settings(settings: &DatabaseSettings) -> Self {
        Self::new(settings.url.as_str()).with_max_size(settings.pool_size)
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }
}

/// Async connection pool for PostgreSQL via Diesel.
///
/// Clones share one pool and one closed flag.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
    closed: Arc<AtomicBool>,
}

impl DbPool {
    /// Build a pool. Connections are opened on demand.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the pool cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(None)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self {
            inner: pool,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Refuse further checkouts on every clone of this pool.
    ///
    /// Idle connections are released when the last clone drops.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        AtomicBool::load(&self.closed, Ordering::Acquire)
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if the pool was closed or a connection
    /// cannot be obtained within the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        if self.is_closed() {
            return Err(PoolError::checkout("pool closed"));
        }
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }

    /// Check out a connection and run `SELECT 1` on it.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` when no connection can be opened and
    /// `PoolError::Probe` when the query fails.
    pub async fn ping(&self) -> Result<(), PoolError> {
        let mut conn = self.get().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| PoolError::probe(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use rstest::rstest;
    use url::Url;

    #[rstest]
    fn pool_config_default_values() {
        let config = PoolConfig::new("postgres://localhost/recipes");

        assert_eq!(config.database_url(), "postgres://localhost/recipes");
        assert_eq!(config.max_size(), 10);
        assert_eq!(config.connection_timeout, DEFAULT_CONNECTION_TIMEOUT);
    }

    #[rstest]
    fn pool_config_follows_settings() {
        let settings = DatabaseSettings {
            url: Url::parse("postgres://app:secret@db:5432/recipes").expect("url"),
            pool_size: 4,
            mode: ExecutionMode::Production,
        };

        let config = PoolConfig::from_settings(&settings);

        assert_eq!(config.database_url(), "postgres://app:secret@db:5432/recipes");
        assert_eq!(config.max_size(), 4);
    }

    #[rstest]
    #[tokio::test]
    async fn closed_pool_refuses_checkout_on_every_clone() {
        let pool = DbPool::new(PoolConfig::new("postgres://localhost:1/recipes"))
            .await
            .expect("lazy pool builds without connecting");
        let clone = pool.clone();

        pool.close();

        assert!(clone.is_closed());
        let err = clone.get().await.err().expect("checkout refused");
        assert_eq!(err, PoolError::checkout("pool closed"));
    }

    #[rstest]
    #[case(PoolError::checkout("connection refused"), "connection refused")]
    #[case(PoolError::build("invalid URL"), "invalid URL")]
    #[case(PoolError::probe("terminating connection"), "terminating connection")]
    fn pool_error_exposes_message(#[case] error: PoolError, #[case] expected: &str) {
        assert_eq!(error.message(), expected);
        assert!(error.to_string().contains(expected));
    }
}
