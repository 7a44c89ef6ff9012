//! Recipe domain service.
//!
//! Each mutation is stored first and then announced through the
//! [`RecipeEventPublisher`]. Publishing is best-effort: a failed publish is
//! logged at error level and the stored result is still returned.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{
    EventPublishError, RecipeEventPublisher, RecipeRepository, RecipeRepositoryError,
    RecipeService,
};
use crate::domain::{
    Error, IngredientDraft, IngredientId, NewRecipe, Recipe, RecipeChanges, RecipeEvent, RecipeId,
    RecipeIngredient, UserId,
};
use crate::logging::Logger;

fn map_repository_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
        RecipeRepositoryError::NotFound { recipe_id } => {
            Error::not_found(format!("recipe {recipe_id} not found"))
                .with_details(json!({ "recipeId": recipe_id }))
        }
    }
}

/// Recipe service over a repository and an event publisher.
pub struct RecipeServiceImpl<R: ?Sized, P: ?Sized> {
    recipe_repo: Arc<R>,
    publisher: Arc<P>,
    logger: Logger,
}

impl<R: ?Sized, P: ?Sized> RecipeServiceImpl<R, P> {
    /// Create a service.
    pub fn new(recipe_repo: Arc<R>, publisher: Arc<P>, logger: Logger) -> Self {
        Self {
            recipe_repo,
            publisher,
            logger,
        }
    }
}

impl<R, P> RecipeServiceImpl<R, P>
where
    R: RecipeRepository + ?Sized,
    P: RecipeEventPublisher + ?Sized,
{
    async fn announce(&self, event: RecipeEvent) {
        let result = match event {
            RecipeEvent::RecipeCreated { recipe_id } => {
                self.publisher.publish_recipe_created(recipe_id).await
            }
            RecipeEvent::RecipeUpdated { recipe_id } => {
                self.publisher.publish_recipe_updated(recipe_id).await
            }
            RecipeEvent::IngredientAdded {
                recipe_id,
                ingredient_id,
            } => {
                self.publisher
                    .publish_ingredient_added(recipe_id, ingredient_id)
                    .await
            }
            RecipeEvent::IngredientRemoved {
                recipe_id,
                ingredient_id,
            } => {
                self.publisher
                    .publish_ingredient_removed(recipe_id, ingredient_id)
                    .await
            }
        };
        if let Err(err) = result {
            self.log_publish_failure(&event, &err);
        }
    }

    fn log_publish_failure(&self, event: &RecipeEvent, err: &EventPublishError) {
        let mut metadata = json!({
            "routingKey": event.kind().routing_key(),
            "recipeId": event.recipe_id(),
        });
        if let Some(ingredient_id) = event.ingredient_id() {
            metadata["ingredientId"] = json!(ingredient_id);
        }
        self.logger
            .error_with_cause("Failed to publish recipe event", Some(&metadata), err);
    }
}

#[async_trait]
impl<R, P> RecipeService for RecipeServiceImpl<R, P>
where
    R: RecipeRepository + ?Sized,
    P: RecipeEventPublisher + ?Sized,
{
    async fn get_recipe_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, Error> {
        self.recipe_repo
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, Error> {
        let created = self
            .recipe_repo
            .create(&recipe)
            .await
            .map_err(map_repository_error)?;
        self.announce(RecipeEvent::RecipeCreated {
            recipe_id: created.id,
        })
        .await;
        Ok(created)
    }

    async fn update_recipe(&self, id: RecipeId, changes: RecipeChanges) -> Result<Recipe, Error> {
        let updated = self
            .recipe_repo
            .update(&id, &changes)
            .await
            .map_err(map_repository_error)?;
        self.announce(RecipeEvent::RecipeUpdated {
            recipe_id: updated.id,
        })
        .await;
        Ok(updated)
    }

    async fn add_ingredient_to_recipe(
        &self,
        recipe_id: RecipeId,
        ingredient: IngredientDraft,
    ) -> Result<RecipeIngredient, Error> {
        let association = self
            .recipe_repo
            .add_ingredient(&recipe_id, &ingredient)
            .await
            .map_err(map_repository_error)?;
        self.announce(RecipeEvent::IngredientAdded {
            recipe_id: association.recipe_id,
            ingredient_id: association.ingredient.id,
        })
        .await;
        Ok(association)
    }

    async fn remove_ingredient_from_recipe(
        &self,
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
    ) -> Result<(), Error> {
        self.recipe_repo
            .remove_ingredient(&recipe_id, &ingredient_id)
            .await
            .map_err(map_repository_error)?;
        self.announce(RecipeEvent::IngredientRemoved {
            recipe_id,
            ingredient_id,
        })
        .await;
        Ok(())
    }

    async fn get_user_recipes(&self, user_id: UserId) -> Result<Vec<Recipe>, Error> {
        self.recipe_repo
            .find_by_user(&user_id)
            .await
            .map_err(map_repository_error)
    }

    async fn get_all_recipes(&self) -> Result<Vec<Recipe>, Error> {
        self.recipe_repo
            .find_all()
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
