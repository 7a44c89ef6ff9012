//! `lapin`-backed [`BrokerDriver`].

use std::sync::Arc;

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ExchangeDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};

use crate::connections::{BrokerDriver, BrokerTarget, DriverError};

const JSON_CONTENT_TYPE: &str = "application/json";
const REPLY_SUCCESS: u16 = 200;

/// AMQP 0-9-1 driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmqpDriver;

impl AmqpDriver {
    /// Create a driver.
    pub fn new() -> Self {
        Self
    }
}

fn driver_error(err: lapin::Error) -> DriverError {
    DriverError::new(err.to_string())
}

#[async_trait]
impl BrokerDriver for AmqpDriver {
    type Client = Arc<Connection>;
    type Channel = Channel;

    async fn open(&self, target: &BrokerTarget) -> Result<Self::Client, DriverError> {
        let connection = Connection::connect(target.url().as_str(), ConnectionProperties::default())
            .await
            .map_err(driver_error)?;
        Ok(Arc::new(connection))
    }

    async fn open_channel(&self, client: &Self::Client) -> Result<Self::Channel, DriverError> {
        client.create_channel().await.map_err(driver_error)
    }

    async fn declare_topic_exchange(
        &self,
        channel: &Self::Channel,
        name: &str,
        durable: bool,
    ) -> Result<(), DriverError> {
        channel
            .exchange_declare(
                name,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(driver_error)
    }

    async fn publish(
        &self,
        channel: &Self::Channel,
        exchange: &str,
        routing_key: &str,
        payload: &[u8],
    ) -> Result<(), DriverError> {
        let confirm = channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_content_type(JSON_CONTENT_TYPE.into()),
            )
            .await
            .map_err(driver_error)?;
        confirm.await.map_err(driver_error)?;
        Ok(())
    }

    async fn close_channel(&self, channel: Self::Channel) -> Result<(), DriverError> {
        channel
            .close(REPLY_SUCCESS, "OK")
            .await
            .map_err(driver_error)
    }

    async fn close(&self, client: Self::Client) -> Result<(), DriverError> {
        client.close(REPLY_SUCCESS, "OK").await.map_err(driver_error)
    }
}
