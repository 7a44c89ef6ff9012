//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::container::ServicesContainer;
use crate::domain::ports::{RecipeService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub recipes: Arc<dyn RecipeService>,
    pub users: Arc<dyn UserService>,
}

impl HttpState {
    pub fn new(recipes: Arc<dyn RecipeService>, users: Arc<dyn UserService>) -> Self {
        Self { recipes, users }
    }
}

impl From<&ServicesContainer> for HttpState {
    fn from(services: &ServicesContainer) -> Self {
        Self::new(
            Arc::clone(services.recipe_service()),
            Arc::clone(services.user_service()),
        )
    }
}
