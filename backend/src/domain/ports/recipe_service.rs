//! Driving port for recipe operations.

use async_trait::async_trait;

use crate::domain::{
    Error, IngredientDraft, IngredientId, NewRecipe, Recipe, RecipeChanges, RecipeId,
    RecipeIngredient, UserId,
};

/// Recipe operations exposed to inbound adapters.
///
/// Mutations emit a recipe event after the change is stored. Reads never
/// emit events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Look up a recipe; `None` when absent.
    async fn get_recipe_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, Error>;

    /// Create a recipe with its ingredients.
    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, Error>;

    /// Change a recipe's name or description.
    async fn update_recipe(&self, id: RecipeId, changes: RecipeChanges) -> Result<Recipe, Error>;

    /// Add one ingredient line to a recipe.
    async fn add_ingredient_to_recipe(
        &self,
        recipe_id: RecipeId,
        ingredient: IngredientDraft,
    ) -> Result<RecipeIngredient, Error>;

    /// Remove an ingredient from a recipe.
    async fn remove_ingredient_from_recipe(
        &self,
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
    ) -> Result<(), Error>;

    /// Recipes authored by a user.
    async fn get_user_recipes(&self, user_id: UserId) -> Result<Vec<Recipe>, Error>;

    /// Every recipe.
    async fn get_all_recipes(&self) -> Result<Vec<Recipe>, Error>;
}
