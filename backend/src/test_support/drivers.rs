//! Recording drivers for connection and publisher tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::memory::InMemoryStore;
use crate::connections::{
    BrokerDriver, BrokerTarget, DatabaseDriver, DatabaseSettings, DriverError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fail_if(failure: Option<&str>) -> Result<(), DriverError> {
    failure.map_or(Ok(()), |message| Err(DriverError::new(message)))
}

#[derive(Debug, Default)]
struct DatabaseLog {
    opens: usize,
    closes: usize,
    open_failure: Option<String>,
    close_failure: Option<String>,
}

/// Database driver whose client is an [`InMemoryStore`].
///
/// Clones share the same store and counters.
#[derive(Debug, Clone, Default)]
pub struct FakeDatabaseDriver {
    store: InMemoryStore,
    log: Arc<Mutex<DatabaseLog>>,
}

impl FakeDatabaseDriver {
    /// Driver whose `open` fails with `message` until [`Self::heal`].
    pub fn failing(message: &str) -> Self {
        let driver = Self::default();
        lock(&driver.log).open_failure = Some(message.to_owned());
        driver
    }

    /// Make every subsequent `close` fail with `message`.
    pub fn fail_close(&self, message: &str) {
        lock(&self.log).close_failure = Some(message.to_owned());
    }

    /// Clear every configured failure.
    pub fn heal(&self) {
        let mut log = lock(&self.log);
        log.open_failure = None;
        log.close_failure = None;
    }

    /// Attempted opens, successful or not.
    pub fn open_count(&self) -> usize {
        lock(&self.log).opens
    }

    /// Attempted closes, successful or not.
    pub fn close_count(&self) -> usize {
        lock(&self.log).closes
    }

    /// Store handed out as the client.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }
}

#[async_trait]
impl DatabaseDriver for FakeDatabaseDriver {
    type Client = InMemoryStore;

    async fn open(&self, _settings: &DatabaseSettings) -> Result<Self::Client, DriverError> {
        let mut log = lock(&self.log);
        log.opens += 1;
        fail_if(log.open_failure.as_deref())?;
        Ok(self.store.clone())
    }

    async fn close(&self, _client: Self::Client) -> Result<(), DriverError> {
        let mut log = lock(&self.log);
        log.closes += 1;
        fail_if(log.close_failure.as_deref())
    }
}

/// Client handle produced by [`FakeBrokerDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeClient(pub usize);

/// Channel handle produced by [`FakeBrokerDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeChannel(pub usize);

/// A message accepted by [`FakeBrokerDriver::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub channel: FakeChannel,
    pub exchange: String,
    pub routing_key: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct BrokerLog {
    opens: usize,
    channels_opened: usize,
    closed_channels: usize,
    closes: usize,
    declared: Vec<(String, bool)>,
    published: Vec<PublishedMessage>,
    open_failure: Option<String>,
    channel_failure: Option<String>,
    declare_failure: Option<String>,
    publish_failure: Option<String>,
    close_failure: Option<String>,
}

/// Broker driver that records every call.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct FakeBrokerDriver {
    log: Arc<Mutex<BrokerLog>>,
}

impl FakeBrokerDriver {
    /// Driver whose `open` fails with `message` until [`Self::heal`].
    pub fn failing(message: &str) -> Self {
        let driver = Self::default();
        lock(&driver.log).open_failure = Some(message.to_owned());
        driver
    }

    /// Make channel and client closes fail with `message`.
    pub fn fail_close(&self, message: &str) {
        lock(&self.log).close_failure = Some(message.to_owned());
    }

    /// Make channel opens fail with `message`.
    pub fn fail_channels(&self, message: &str) {
        lock(&self.log).channel_failure = Some(message.to_owned());
    }

    /// Make exchange declarations fail with `message`.
    pub fn fail_declare(&self, message: &str) {
        lock(&self.log).declare_failure = Some(message.to_owned());
    }

    /// Make publishes fail with `message`.
    pub fn fail_publish(&self, message: &str) {
        lock(&self.log).publish_failure = Some(message.to_owned());
    }

    /// Clear every configured failure.
    pub fn heal(&self) {
        let mut log = lock(&self.log);
        log.open_failure = None;
        log.channel_failure = None;
        log.declare_failure = None;
        log.publish_failure = None;
        log.close_failure = None;
    }

    pub fn open_count(&self) -> usize {
        lock(&self.log).opens
    }

    /// Channels successfully opened.
    pub fn channel_count(&self) -> usize {
        lock(&self.log).channels_opened
    }

    /// Channel close attempts.
    pub fn closed_channels(&self) -> usize {
        lock(&self.log).closed_channels
    }

    /// Client close attempts.
    pub fn close_count(&self) -> usize {
        lock(&self.log).closes
    }

    /// `(name, durable)` per successful declaration.
    pub fn declared_exchanges(&self) -> Vec<(String, bool)> {
        lock(&self.log).declared.clone()
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        lock(&self.log).published.clone()
    }
}

#[async_trait]
impl BrokerDriver for FakeBrokerDriver {
    type Client = FakeClient;
    type Channel = FakeChannel;

    async fn open(&self, _target: &BrokerTarget) -> Result<Self::Client, DriverError> {
        let mut log = lock(&self.log);
        log.opens += 1;
        fail_if(log.open_failure.as_deref())?;
        Ok(FakeClient(log.opens))
    }

    async fn open_channel(&self, _client: &Self::Client) -> Result<Self::Channel, DriverError> {
        let mut log = lock(&self.log);
        fail_if(log.channel_failure.as_deref())?;
        log.channels_opened += 1;
        Ok(FakeChannel(log.channels_opened))
    }

    async fn declare_topic_exchange(
        &self,
        _channel: &Self::Channel,
        name: &str,
        durable: bool,
    ) -> Result<(), DriverError> {
        let mut log = lock(&self.log);
        fail_if(log.declare_failure.as_deref())?;
        log.declared.push((name.to_owned(), durable));
        Ok(())
    }

    async fn publish(
        &self,
        channel: &Self::Channel,
        exchange: &str,
        routing_key: &str,
        payload: &[u8],
    ) -> Result<(), DriverError> {
        let mut log = lock(&self.log);
        fail_if(log.publish_failure.as_deref())?;
        log.published.push(PublishedMessage {
            channel: *channel,
            exchange: exchange.to_owned(),
            routing_key: routing_key.to_owned(),
            payload: payload.to_vec(),
        });
        Ok(())
    }

    async fn close_channel(&self, _channel: Self::Channel) -> Result<(), DriverError> {
        let mut log = lock(&self.log);
        log.closed_channels += 1;
        fail_if(log.close_failure.as_deref())
    }

    async fn close(&self, _client: Self::Client) -> Result<(), DriverError> {
        let mut log = lock(&self.log);
        log.closes += 1;
        fail_if(log.close_failure.as_deref())
    }
}
