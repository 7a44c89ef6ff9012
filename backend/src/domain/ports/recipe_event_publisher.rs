//! Port for emitting recipe change notifications.

use async_trait::async_trait;

use crate::domain::{IngredientId, RecipeId};

use super::define_port_error;

define_port_error! {
    /// Errors raised while publishing recipe events.
    pub enum EventPublishError {
        /// No channel could be obtained for the event.
        Channel { message: String } => "event channel unavailable: {message}",
        /// The exchange could not be declared.
        Exchange { message: String } => "event exchange declaration failed: {message}",
        /// The broker rejected or dropped the message.
        Publish { message: String } => "event publish failed: {message}",
    }
}

/// Emits one notification per recipe mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeEventPublisher: Send + Sync {
    /// A recipe was created.
    async fn publish_recipe_created(&self, recipe_id: RecipeId) -> Result<(), EventPublishError>;

    /// A recipe's fields changed.
    async fn publish_recipe_updated(&self, recipe_id: RecipeId) -> Result<(), EventPublishError>;

    /// An ingredient was associated with a recipe.
    async fn publish_ingredient_added(
        &self,
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
    ) -> Result<(), EventPublishError>;

    /// An ingredient association was removed.
    async fn publish_ingredient_removed(
        &self,
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
    ) -> Result<(), EventPublishError>;
}
