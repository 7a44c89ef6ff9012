//! Aggregate of configured application services.

use std::sync::Arc;

use crate::config::Configuration;
use crate::domain::ports::{RecipeService, UserService};
use crate::logging::Logger;

/// Configuration, logger, and services built on established connections.
#[derive(Clone)]
pub struct ServicesContainer {
    configuration: Arc<Configuration>,
    logger: Logger,
    user_service: Arc<dyn UserService>,
    recipe_service: Arc<dyn RecipeService>,
}

impl ServicesContainer {
    /// Assemble a container.
    pub(crate) fn new(
        configuration: Arc<Configuration>,
        logger: Logger,
        user_service: Arc<dyn UserService>,
        recipe_service: Arc<dyn RecipeService>,
    ) -> Self {
        Self {
            configuration,
            logger,
            user_service,
            recipe_service,
        }
    }

    /// Loaded configuration.
    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    /// Application logger.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// User service.
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.user_service
    }

    /// Recipe service.
    pub fn recipe_service(&self) -> &Arc<dyn RecipeService> {
        &self.recipe_service
    }
}
