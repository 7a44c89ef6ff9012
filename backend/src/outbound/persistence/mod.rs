//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations of the domain ports backed by PostgreSQL via
//! `diesel-async` and a `bb8` pool. Row structs (`models.rs`) and table
//! definitions (`schema.rs`) stay internal to this module; adapters only
//! translate between rows and domain types.

mod diesel_error_mapping;
mod diesel_recipe_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod postgres_driver;
mod schema;

pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use postgres_driver::PostgresDriver;
