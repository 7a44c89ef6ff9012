//! Broker-backed adapters.
//!
//! [`TopicEventPublisher`] implements the domain's `RecipeEventPublisher` port
//! over any [`BrokerDriver`](crate::connections::BrokerDriver);
//! [`AmqpDriver`] is the production driver backed by `lapin`.

mod amqp_driver;
mod topic_publisher;

pub use amqp_driver::AmqpDriver;
pub use topic_publisher::TopicEventPublisher;
