//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod recipe_event_publisher;
mod recipe_repository;
mod recipe_service;
mod user_repository;
mod user_service;

#[cfg(test)]
pub use recipe_event_publisher::MockRecipeEventPublisher;
pub use recipe_event_publisher::{EventPublishError, RecipeEventPublisher};
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{RecipeRepository, RecipeRepositoryError};
#[cfg(test)]
pub use recipe_service::MockRecipeService;
pub use recipe_service::RecipeService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use user_service::MockUserService;
pub use user_service::UserService;
