//! Aggregate of the process's external connections.

use std::sync::Arc;

use crate::config::Configuration;
use crate::connections::{
    BrokerConnection, BrokerDriver, ConnectionError, DatabaseConnection, DatabaseDriver,
};
use crate::logging::Logger;

/// Holds exactly one database and one broker connection, both connected.
pub struct ConnectionsContainer<D: DatabaseDriver, B: BrokerDriver> {
    database: Arc<DatabaseConnection<D>>,
    broker: Arc<BrokerConnection<B>>,
}

impl<D: DatabaseDriver, B: BrokerDriver> ConnectionsContainer<D, B> {
    /// Connect the database and then the broker.
    ///
    /// When the broker fails the freshly opened database connection is
    /// closed again before the error is returned.
    pub(crate) async fn establish(
        database_driver: D,
        broker_driver: B,
        config: Arc<Configuration>,
        logger: Logger,
    ) -> Result<Self, ConnectionError> {
        let database = Arc::new(DatabaseConnection::new(
            database_driver,
            Arc::clone(&config),
            logger.clone(),
        ));
        let broker = Arc::new(BrokerConnection::new(broker_driver, config, logger));

        database.connect().await?;
        if let Err(err) = broker.connect().await {
            database.disconnect().await;
            return Err(err);
        }
        Ok(Self { database, broker })
    }

    /// Database connection.
    pub fn database(&self) -> &Arc<DatabaseConnection<D>> {
        &self.database
    }

    /// Broker connection.
    pub fn broker(&self) -> &Arc<BrokerConnection<B>> {
        &self.broker
    }
}
