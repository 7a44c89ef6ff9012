//! [`DatabaseDriver`] that opens a pooled PostgreSQL client.

use async_trait::async_trait;
use tracing::debug;

use super::pool::{DbPool, PoolConfig};
use crate::connections::{DatabaseDriver, DatabaseSettings, DriverError};

/// Builds a [`DbPool`] and verifies one connection before handing it out.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl PostgresDriver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    type Client = DbPool;

    async fn open(&self, settings: &DatabaseSettings) -> Result<Self::Client, DriverError> {
        debug!(
            mode = %settings.mode,
            pool_size = settings.pool_size,
            "building database pool"
        );
        let pool = DbPool::new(PoolConfig::from_settings(settings))
            .await
            .map_err(|err| DriverError::new(err.message()))?;
        pool.ping()
            .await
            .map_err(|err| DriverError::new(err.message()))?;
        Ok(pool)
    }

    async fn close(&self, client: Self::Client) -> Result<(), DriverError> {
        // Repositories keep pool clones; their checkouts fail from here on.
        // Sockets stay open until the last clone drops at process exit.
        client.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::RecipeRepository;
    use crate::domain::RecipeId;
    use crate::outbound::persistence::DieselRecipeRepository;
    use mockable::DefaultClock;
    use std::sync::Arc;

    #[tokio::test]
    async fn close_stops_repositories_sharing_the_pool() {
        let pool = DbPool::new(PoolConfig::new("postgres://localhost:1/recipes"))
            .await
            .expect("lazy pool builds without connecting");
        let repository = DieselRecipeRepository::new(pool.clone(), Arc::new(DefaultClock));

        PostgresDriver::new()
            .close(pool)
            .await
            .expect("close succeeds");

        let err = repository
            .find_by_id(&RecipeId::random())
            .await
            .err()
            .expect("repository refuses work");
        assert!(err.to_string().contains("pool closed"));
    }
}
