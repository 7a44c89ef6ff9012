//! In-memory repositories sharing one store.
//!
//! Mirrors the relational layout: ingredients are unique by name and shared
//! across recipes, associations link a recipe to an ingredient with an
//! amount.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{
    RecipeRepository, RecipeRepositoryError, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Ingredient, IngredientDraft, IngredientId, NewRecipe, NewUser, Recipe, RecipeChanges,
    RecipeId, RecipeIngredient, RecipeIngredientId, User, UserId,
};

#[derive(Debug, Clone)]
struct RecipeRow {
    id: RecipeId,
    name: String,
    description: Option<String>,
    author_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct AssociationRow {
    id: RecipeIngredientId,
    recipe_id: RecipeId,
    ingredient_id: IngredientId,
    amount: String,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    recipes: Vec<RecipeRow>,
    ingredients: Vec<Ingredient>,
    associations: Vec<AssociationRow>,
}

impl Tables {
    fn upsert_ingredient(&mut self, name: &str) -> Ingredient {
        if let Some(existing) = self.ingredients.iter().find(|i| i.name == name) {
            return existing.clone();
        }
        let ingredient = Ingredient {
            id: IngredientId::random(),
            name: name.to_owned(),
        };
        self.ingredients.push(ingredient.clone());
        ingredient
    }

    fn associate(&mut self, recipe_id: RecipeId, draft: &IngredientDraft) -> RecipeIngredient {
        let ingredient = self.upsert_ingredient(draft.name());
        let row = AssociationRow {
            id: RecipeIngredientId::random(),
            recipe_id,
            ingredient_id: ingredient.id,
            amount: draft.amount().to_owned(),
        };
        self.associations.push(row.clone());
        RecipeIngredient {
            id: row.id,
            recipe_id,
            ingredient,
            amount: row.amount,
        }
    }

    fn assemble(&self, row: &RecipeRow) -> Recipe {
        let ingredients = self
            .associations
            .iter()
            .filter(|association| association.recipe_id == row.id)
            .filter_map(|association| {
                let ingredient = self
                    .ingredients
                    .iter()
                    .find(|i| i.id == association.ingredient_id)?;
                Some(RecipeIngredient {
                    id: association.id,
                    recipe_id: row.id,
                    ingredient: ingredient.clone(),
                    amount: association.amount.clone(),
                })
            })
            .collect();
        Recipe {
            id: row.id,
            name: row.name.clone(),
            description: row.description.clone(),
            author_id: row.author_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            ingredients,
        }
    }

    fn recipes_where(&self, keep: impl Fn(&RecipeRow) -> bool) -> Vec<Recipe> {
        self.recipes
            .iter()
            .filter(|row| keep(row))
            .map(|row| self.assemble(row))
            .collect()
    }
}

/// Shared tables behind the in-memory repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Every stored ingredient, in insertion order.
    pub fn ingredients(&self) -> Vec<Ingredient> {
        self.lock().ingredients.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`UserRepository`] over an [`InMemoryStore`].
pub struct InMemoryUserRepository {
    store: InMemoryStore,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRepository {
    pub fn new(store: InMemoryStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.store.lock().users.iter().find(|u| u.id == *id).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let now = self.clock.utc();
        let created = User {
            id: UserId::random(),
            name: user.name().to_owned(),
            email: user.email().map(str::to_owned),
            created_at: now,
            updated_at: now,
        };
        self.store.lock().users.push(created.clone());
        Ok(created)
    }
}

/// [`RecipeRepository`] over an [`InMemoryStore`].
pub struct InMemoryRecipeRepository {
    store: InMemoryStore,
    clock: Arc<dyn Clock>,
}

impl InMemoryRecipeRepository {
    pub fn new(store: InMemoryStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let tables = self.store.lock();
        Ok(tables
            .recipes
            .iter()
            .find(|row| row.id == *id)
            .map(|row| tables.assemble(row)))
    }

    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError> {
        let mut tables = self.store.lock();
        if !tables.users.iter().any(|u| u.id == recipe.author_id()) {
            return Err(RecipeRepositoryError::query(format!(
                "author {} does not exist",
                recipe.author_id()
            )));
        }
        let now = self.clock.utc();
        let row = RecipeRow {
            id: RecipeId::random(),
            name: recipe.name().to_owned(),
            description: recipe.description().map(str::to_owned),
            author_id: recipe.author_id(),
            created_at: now,
            updated_at: now,
        };
        tables.recipes.push(row.clone());
        for draft in recipe.ingredients() {
            tables.associate(row.id, draft);
        }
        Ok(tables.assemble(&row))
    }

    async fn update(
        &self,
        id: &RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let now = self.clock.utc();
        let mut tables = self.store.lock();
        let row = tables
            .recipes
            .iter_mut()
            .find(|row| row.id == *id)
            .ok_or_else(|| RecipeRepositoryError::not_found(*id))?;
        if let Some(name) = changes.name() {
            name.clone_into(&mut row.name);
        }
        if let Some(description) = changes.description() {
            row.description = Some(description.to_owned());
        }
        row.updated_at = now;
        let row = row.clone();
        Ok(tables.assemble(&row))
    }

    async fn add_ingredient(
        &self,
        recipe_id: &RecipeId,
        ingredient: &IngredientDraft,
    ) -> Result<RecipeIngredient, RecipeRepositoryError> {
        let mut tables = self.store.lock();
        if !tables.recipes.iter().any(|row| row.id == *recipe_id) {
            return Err(RecipeRepositoryError::not_found(*recipe_id));
        }
        Ok(tables.associate(*recipe_id, ingredient))
    }

    async fn remove_ingredient(
        &self,
        recipe_id: &RecipeId,
        ingredient_id: &IngredientId,
    ) -> Result<(), RecipeRepositoryError> {
        self.store.lock().associations.retain(|association| {
            association.recipe_id != *recipe_id || association.ingredient_id != *ingredient_id
        });
        Ok(())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        Ok(self
            .store
            .lock()
            .recipes_where(|row| row.author_id == *user_id))
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        Ok(self.store.lock().recipes_where(|_| true))
    }
}
