//! Domain primitives, aggregates, ports, and services.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, Recipe, Ingredient, RecipeIngredient: persisted aggregates.
//! - RecipeEvent: change notification emitted after each recipe mutation.
//! - UserServiceImpl / RecipeServiceImpl: driving-port implementations.

pub mod error;
pub mod events;
mod ids;
pub mod ports;
pub mod recipe;
pub mod recipe_service;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::events::{RECIPE_EVENTS_EXCHANGE, RecipeEvent, RecipeEventKind};
pub use self::recipe::{
    Ingredient, IngredientDraft, IngredientId, NewRecipe, Recipe, RecipeChanges, RecipeId,
    RecipeIngredient, RecipeIngredientId, RecipeValidationError,
};
pub use self::recipe_service::RecipeServiceImpl;
pub use self::user::{NewUser, User, UserId, UserValidationError};
pub use self::user_service::UserServiceImpl;
