//! Port for recipe persistence.
//!
//! Ingredients are shared by name: adding "Sugar" to two recipes must reuse
//! one ingredient record. Adapters pass calls straight through to storage
//! without retries or caching.

use async_trait::async_trait;

use crate::domain::{
    IngredientDraft, IngredientId, NewRecipe, Recipe, RecipeChanges, RecipeId, RecipeIngredient,
    UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "recipe repository query failed: {message}",
        /// The addressed recipe does not exist.
        NotFound { recipe_id: RecipeId } =>
            "recipe {recipe_id} not found",
    }
}

/// Recipe storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Fetch a recipe with its ingredients.
    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Insert a recipe and its ingredient lines atomically.
    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError>;

    /// Apply `changes` and refresh the modification time.
    ///
    /// Fails with [`RecipeRepositoryError::NotFound`] for unknown recipes.
    async fn update(
        &self,
        id: &RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Recipe, RecipeRepositoryError>;

    /// Associate an ingredient, creating it by name when new.
    ///
    /// Fails with [`RecipeRepositoryError::NotFound`] for unknown recipes.
    async fn add_ingredient(
        &self,
        recipe_id: &RecipeId,
        ingredient: &IngredientDraft,
    ) -> Result<RecipeIngredient, RecipeRepositoryError>;

    /// Remove every association between the recipe and the ingredient.
    ///
    /// Removing an absent association succeeds. The ingredient itself is
    /// never deleted.
    async fn remove_ingredient(
        &self,
        recipe_id: &RecipeId,
        ingredient_id: &IngredientId,
    ) -> Result<(), RecipeRepositoryError>;

    /// Recipes authored by `user_id`.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Recipe>, RecipeRepositoryError>;

    /// Every recipe.
    async fn find_all(&self) -> Result<Vec<Recipe>, RecipeRepositoryError>;
}
