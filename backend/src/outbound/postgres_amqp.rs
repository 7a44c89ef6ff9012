//! Production wiring: PostgreSQL through Diesel and RabbitMQ through lapin.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use super::messaging::AmqpDriver;
use super::persistence::{DbPool, DieselRecipeRepository, DieselUserRepository, PostgresDriver};
use crate::container::Infrastructure;
use crate::domain::ports::{RecipeRepository, UserRepository};

/// [`Infrastructure`] for a deployed process.
#[derive(Clone)]
pub struct PostgresAmqpInfrastructure {
    clock: Arc<dyn Clock>,
}

impl Default for PostgresAmqpInfrastructure {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresAmqpInfrastructure {
    /// Wiring that stamps rows with the system clock.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(DefaultClock),
        }
    }
}

impl Infrastructure for PostgresAmqpInfrastructure {
    type Database = PostgresDriver;
    type Broker = AmqpDriver;

    fn database_driver(&self) -> Self::Database {
        PostgresDriver::new()
    }

    fn broker_driver(&self) -> Self::Broker {
        AmqpDriver::new()
    }

    fn user_repository(&self, client: &DbPool) -> Arc<dyn UserRepository> {
        Arc::new(DieselUserRepository::new(
            client.clone(),
            Arc::clone(&self.clock),
        ))
    }

    fn recipe_repository(&self, client: &DbPool) -> Arc<dyn RecipeRepository> {
        Arc::new(DieselRecipeRepository::new(
            client.clone(),
            Arc::clone(&self.clock),
        ))
    }
}
