//! Infrastructure wiring for tests: fake drivers and in-memory repositories.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use super::drivers::{FakeBrokerDriver, FakeDatabaseDriver};
use super::memory::{InMemoryRecipeRepository, InMemoryStore, InMemoryUserRepository};
use crate::container::Infrastructure;
use crate::domain::ports::{RecipeRepository, UserRepository};

/// [`Infrastructure`] backed entirely by in-process fakes.
///
/// # Examples
///
/// ```
/// use recipe_backend::container::AppContext;
/// use recipe_backend::test_support::{InMemoryInfrastructure, StaticEnv};
///
/// let infrastructure = InMemoryInfrastructure::new();
/// let broker = infrastructure.broker().clone();
/// let context = AppContext::new(StaticEnv::complete(), infrastructure);
/// assert!(context.services().is_err());
/// assert_eq!(broker.open_count(), 0);
/// ```
#[derive(Clone)]
pub struct InMemoryInfrastructure {
    database: FakeDatabaseDriver,
    broker: FakeBrokerDriver,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryInfrastructure {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryInfrastructure {
    /// Healthy drivers and the system clock.
    pub fn new() -> Self {
        Self::with_drivers(FakeDatabaseDriver::default(), FakeBrokerDriver::default())
    }

    /// Wire the given drivers, sharing their recorded state with the caller.
    pub fn with_drivers(database: FakeDatabaseDriver, broker: FakeBrokerDriver) -> Self {
        Self {
            database,
            broker,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replace the clock used for repository timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn database(&self) -> &FakeDatabaseDriver {
        &self.database
    }

    pub fn broker(&self) -> &FakeBrokerDriver {
        &self.broker
    }
}

impl Infrastructure for InMemoryInfrastructure {
    type Database = FakeDatabaseDriver;
    type Broker = FakeBrokerDriver;

    fn database_driver(&self) -> Self::Database {
        self.database.clone()
    }

    fn broker_driver(&self) -> Self::Broker {
        self.broker.clone()
    }

    fn user_repository(&self, client: &InMemoryStore) -> Arc<dyn UserRepository> {
        Arc::new(InMemoryUserRepository::new(
            client.clone(),
            Arc::clone(&self.clock),
        ))
    }

    fn recipe_repository(&self, client: &InMemoryStore) -> Arc<dyn RecipeRepository> {
        Arc::new(InMemoryRecipeRepository::new(
            client.clone(),
            Arc::clone(&self.clock),
        ))
    }
}
