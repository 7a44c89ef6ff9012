//! PostgreSQL-backed `RecipeRepository` implementation using Diesel ORM.
//!
//! Ingredients are upserted by their unique name, so two recipes that both
//! use "Sugar" share one ingredient row. Recipes are always returned with
//! their ingredient associations, loaded in one joined query per call.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{RecipeRepository, RecipeRepositoryError};
use crate::domain::{
    Ingredient, IngredientDraft, IngredientId, NewRecipe, Recipe, RecipeChanges, RecipeId,
    RecipeIngredient, RecipeIngredientId, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    IngredientRow, NewIngredientRow, NewRecipeIngredientRow, NewRecipeRow, RecipeChangeset,
    RecipeIngredientRow, RecipeRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{ingredients, recipe_ingredients, recipes};

/// Diesel-backed implementation of the `RecipeRepository` port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn pool_error(error: PoolError) -> RecipeRepositoryError {
    map_pool_error(error, RecipeRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> RecipeRepositoryError {
    map_diesel_error(
        error,
        RecipeRepositoryError::query,
        RecipeRepositoryError::connection,
    )
}

type AssociationRows = Vec<(RecipeIngredientRow, IngredientRow)>;

fn to_association(row: RecipeIngredientRow, ingredient: IngredientRow) -> RecipeIngredient {
    RecipeIngredient {
        id: RecipeIngredientId::from_uuid(row.id),
        recipe_id: RecipeId::from_uuid(row.recipe_id),
        ingredient: Ingredient {
            id: IngredientId::from_uuid(row.ingredient_id),
            name: ingredient.name,
        },
        amount: row.amount,
    }
}

/// Attach association rows to their recipes, keeping recipe order.
fn assemble(recipe_rows: Vec<RecipeRow>, association_rows: AssociationRows) -> Vec<Recipe> {
    let mut by_recipe: HashMap<Uuid, Vec<RecipeIngredient>> = HashMap::new();
    for (row, ingredient) in association_rows {
        by_recipe
            .entry(row.recipe_id)
            .or_default()
            .push(to_association(row, ingredient));
    }

    recipe_rows
        .into_iter()
        .map(|row| Recipe {
            id: RecipeId::from_uuid(row.id),
            ingredients: by_recipe.remove(&row.id).unwrap_or_default(),
            name: row.name,
            description: row.description,
            author_id: UserId::from_uuid(row.author_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect()
}

async fn load_associations(
    conn: &mut AsyncPgConnection,
    recipe_ids: &[Uuid],
) -> QueryResult<AssociationRows> {
    if recipe_ids.is_empty() {
        return Ok(Vec::new());
    }
    recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
        .select((RecipeIngredientRow::as_select(), IngredientRow::as_select()))
        .load(conn)
        .await
}

async fn with_ingredients(
    conn: &mut AsyncPgConnection,
    recipe_rows: Vec<RecipeRow>,
) -> QueryResult<Vec<Recipe>> {
    let ids: Vec<Uuid> = recipe_rows.iter().map(|row| row.id).collect();
    let associations = load_associations(conn, &ids).await?;
    Ok(assemble(recipe_rows, associations))
}

/// Insert the ingredient unless a row with the same name exists, returning
/// the stored row either way.
async fn upsert_ingredient(conn: &mut AsyncPgConnection, name: &str) -> QueryResult<IngredientRow> {
    diesel::insert_into(ingredients::table)
        .values(&NewIngredientRow {
            id: Uuid::new_v4(),
            name,
        })
        .on_conflict(ingredients::name)
        .do_update()
        .set(ingredients::name.eq(excluded(ingredients::name)))
        .returning(IngredientRow::as_returning())
        .get_result(conn)
        .await
}

async fn associate(
    conn: &mut AsyncPgConnection,
    recipe_id: Uuid,
    draft: &IngredientDraft,
) -> QueryResult<RecipeIngredient> {
    let ingredient = upsert_ingredient(conn, draft.name()).await?;
    let row = diesel::insert_into(recipe_ingredients::table)
        .values(&NewRecipeIngredientRow {
            id: Uuid::new_v4(),
            recipe_id,
            ingredient_id: ingredient.id,
            amount: draft.amount(),
        })
        .returning(RecipeIngredientRow::as_returning())
        .get_result(conn)
        .await?;
    Ok(to_association(row, ingredient))
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn find_by_id(&self, id: &RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<RecipeRow> = recipes::table
            .find(id.as_uuid())
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let recipes = with_ingredients(&mut conn, vec![row])
            .await
            .map_err(diesel_error)?;
        Ok(recipes.into_iter().next())
    }

    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let now = self.clock.utc();

        let created = conn
            .transaction(|conn| {
                async move {
                    let row = diesel::insert_into(recipes::table)
                        .values(&NewRecipeRow {
                            id: Uuid::new_v4(),
                            name: recipe.name(),
                            description: recipe.description(),
                            author_id: *recipe.author_id().as_uuid(),
                            created_at: now,
                            updated_at: now,
                        })
                        .returning(RecipeRow::as_returning())
                        .get_result::<RecipeRow>(conn)
                        .await?;

                    let mut associations = Vec::with_capacity(recipe.ingredients().len());
                    for draft in recipe.ingredients() {
                        associations.push(associate(conn, row.id, draft).await?);
                    }

                    Ok::<_, diesel::result::Error>(Recipe {
                        id: RecipeId::from_uuid(row.id),
                        name: row.name,
                        description: row.description,
                        author_id: UserId::from_uuid(row.author_id),
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                        ingredients: associations,
                    })
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        Ok(created)
    }

    async fn update(
        &self,
        id: &RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<RecipeRow> = diesel::update(recipes::table.find(id.as_uuid()))
            .set(&RecipeChangeset {
                name: changes.name(),
                description: changes.description(),
                updated_at: self.clock.utc(),
            })
            .returning(RecipeRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        let row = row.ok_or_else(|| RecipeRepositoryError::not_found(*id))?;

        let recipes = with_ingredients(&mut conn, vec![row])
            .await
            .map_err(diesel_error)?;
        recipes
            .into_iter()
            .next()
            .ok_or_else(|| RecipeRepositoryError::not_found(*id))
    }

    async fn add_ingredient(
        &self,
        recipe_id: &RecipeId,
        ingredient: &IngredientDraft,
    ) -> Result<RecipeIngredient, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let recipe_uuid = *recipe_id.as_uuid();

        let added = conn
            .transaction(|conn| {
                async move {
                    let exists: Option<Uuid> = recipes::table
                        .find(recipe_uuid)
                        .select(recipes::id)
                        .first(conn)
                        .await
                        .optional()?;
                    if exists.is_none() {
                        return Ok(None);
                    }
                    associate(conn, recipe_uuid, ingredient).await.map(Some)
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        added.ok_or_else(|| RecipeRepositoryError::not_found(*recipe_id))
    }

    async fn remove_ingredient(
        &self,
        recipe_id: &RecipeId,
        ingredient_id: &IngredientId,
    ) -> Result<(), RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        diesel::delete(
            recipe_ingredients::table
                .filter(recipe_ingredients::recipe_id.eq(recipe_id.as_uuid()))
                .filter(recipe_ingredients::ingredient_id.eq(ingredient_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(diesel_error)
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<RecipeRow> = recipes::table
            .filter(recipes::author_id.eq(user_id.as_uuid()))
            .order((recipes::created_at.asc(), recipes::id.asc()))
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        with_ingredients(&mut conn, rows)
            .await
            .map_err(diesel_error)
    }

    async fn find_all(&self) -> Result<Vec<Recipe>, RecipeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<RecipeRow> = recipes::table
            .order((recipes::created_at.asc(), recipes::id.asc()))
            .select(RecipeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        with_ingredients(&mut conn, rows)
            .await
            .map_err(diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn recipe_row(id: Uuid) -> RecipeRow {
        RecipeRow {
            id,
            name: "Pancakes".into(),
            description: None,
            author_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn association_row(recipe_id: Uuid, name: &str) -> (RecipeIngredientRow, IngredientRow) {
        let ingredient_id = Uuid::new_v4();
        (
            RecipeIngredientRow {
                id: Uuid::new_v4(),
                recipe_id,
                ingredient_id,
                amount: "1 cup".into(),
            },
            IngredientRow {
                id: ingredient_id,
                name: name.into(),
            },
        )
    }

    #[rstest]
    fn assemble_groups_ingredients_by_recipe() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let recipes = assemble(
            vec![recipe_row(first), recipe_row(second)],
            vec![
                association_row(second, "Milk"),
                association_row(first, "Flour"),
                association_row(first, "Egg"),
            ],
        );

        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].id, RecipeId::from_uuid(first));
        let names: Vec<&str> = recipes[0]
            .ingredients
            .iter()
            .map(|i| i.ingredient.name.as_str())
            .collect();
        assert_eq!(names, ["Flour", "Egg"]);
        assert_eq!(recipes[1].ingredients.len(), 1);
    }

    #[rstest]
    fn assemble_keeps_recipes_without_ingredients() {
        let id = Uuid::new_v4();
        let recipes = assemble(vec![recipe_row(id)], Vec::new());
        assert_eq!(recipes.len(), 1);
        assert!(recipes[0].ingredients.is_empty());
    }

    #[rstest]
    fn association_carries_ingredient_identity() {
        let recipe_id = Uuid::new_v4();
        let (row, ingredient) = association_row(recipe_id, "Sugar");
        let ingredient_id = row.ingredient_id;

        let association = to_association(row, ingredient);

        assert_eq!(association.recipe_id, RecipeId::from_uuid(recipe_id));
        assert_eq!(association.ingredient.id, IngredientId::from_uuid(ingredient_id));
        assert_eq!(association.ingredient.name, "Sugar");
    }
}
