//! Wiring from connected clients to repository adapters.

use std::sync::Arc;

use crate::connections::{BrokerDriver, DatabaseDriver};
use crate::domain::ports::{RecipeRepository, UserRepository};

/// Chooses the drivers an [`AppContext`](super::AppContext) connects with and
/// builds repositories on top of the resulting database client.
pub trait Infrastructure: Send + Sync + 'static {
    /// Database driver.
    type Database: DatabaseDriver;
    /// Broker driver.
    type Broker: BrokerDriver;

    /// Driver used for the database connection.
    fn database_driver(&self) -> Self::Database;

    /// Driver used for the broker connection and event publishing.
    fn broker_driver(&self) -> Self::Broker;

    /// User repository over a connected database client.
    fn user_repository(
        &self,
        client: &<Self::Database as DatabaseDriver>::Client,
    ) -> Arc<dyn UserRepository>;

    /// Recipe repository over a connected database client.
    fn recipe_repository(
        &self,
        client: &<Self::Database as DatabaseDriver>::Client,
    ) -> Arc<dyn RecipeRepository>;
}
