//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`,
//! through the `test-support` feature). Nothing here talks to a real
//! database or broker.

mod clock;
mod drivers;
mod env;
mod infrastructure;
mod logs;
mod memory;

pub use clock::MutableClock;
pub use drivers::{
    FakeBrokerDriver, FakeChannel, FakeClient, FakeDatabaseDriver, PublishedMessage,
};
pub use env::StaticEnv;
pub use infrastructure::InMemoryInfrastructure;
pub use logs::LogBuffer;
pub use memory::{InMemoryRecipeRepository, InMemoryStore, InMemoryUserRepository};
