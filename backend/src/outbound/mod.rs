//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **messaging**: recipe event publishing over AMQP
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod messaging;
pub mod persistence;
mod postgres_amqp;

pub use postgres_amqp::PostgresAmqpInfrastructure;
