//! Recipe API handlers.
//!
//! ```text
//! GET    /api/v1/recipes
//! GET    /api/v1/recipes/{id}
//! POST   /api/v1/recipes {"name":"Bread","authorId":"…","ingredients":[{"name":"Flour","amount":"500g"}]}
//! PATCH  /api/v1/recipes/{id} {"description":"Crusty"}
//! POST   /api/v1/recipes/{id}/ingredients {"name":"Salt","amount":"1 tsp"}
//! DELETE /api/v1/recipes/{id}/ingredients/{ingredientId}
//! GET    /api/v1/users/{userId}/recipes
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, IngredientDraft, IngredientId, NewRecipe, Recipe, RecipeChanges, RecipeId,
    RecipeIngredient, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, recipe_validation_error};

const RECIPE_ID: FieldName = FieldName::new("recipeId");
const INGREDIENT_ID: FieldName = FieldName::new("ingredientId");
const AUTHOR_ID: FieldName = FieldName::new("authorId");
const USER_ID: FieldName = FieldName::new("userId");

/// One ingredient line.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequest {
    pub name: String,
    pub amount: String,
}

/// Request body for `POST /api/v1/recipes`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author_id: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientRequest>,
}

/// Request body for `PATCH /api/v1/recipes/{id}`; absent fields are kept.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateRecipeRequest {
    fn into_new_recipe(self) -> Result<NewRecipe, Error> {
        let author_id: UserId = parse_id(&self.author_id, AUTHOR_ID)?;
        let ingredients = self
            .ingredients
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                IngredientDraft::new(line.name, line.amount)
                    .map_err(|err| recipe_validation_error(err, Some(index)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        NewRecipe::new(self.name, self.description, author_id, ingredients)
            .map_err(|err| recipe_validation_error(err, None))
    }
}

fn recipe_not_found(id: RecipeId) -> Error {
    Error::not_found(format!("recipe {id} not found")).with_details(json!({ "recipeId": id }))
}

/// List every recipe.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    responses(
        (status = 200, description = "Recipes", body = [Recipe]),
        (status = 503, description = "Storage unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
#[get("/recipes")]
pub async fn list_recipes(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Recipe>>> {
    Ok(web::Json(state.recipes.get_all_recipes().await?))
}

/// Fetch one recipe with its ingredients.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe UUID")),
    responses(
        (status = 200, description = "Recipe", body = Recipe),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe"
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Recipe>> {
    let id: RecipeId = parse_id(&path, RECIPE_ID)?;
    state
        .recipes
        .get_recipe_by_id(id)
        .await?
        .map(web::Json)
        .ok_or_else(|| recipe_not_found(id))
}

/// Create a recipe and its ingredient lines.
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Created", body = Recipe),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    payload: web::Json<CreateRecipeRequest>,
) -> ApiResult<HttpResponse> {
    let new_recipe = payload.into_inner().into_new_recipe()?;
    let recipe = state.recipes.create_recipe(new_recipe).await?;
    Ok(HttpResponse::Created().json(recipe))
}

/// Change a recipe's name or description.
#[utoipa::path(
    patch,
    path = "/api/v1/recipes/{id}",
    params(("id" = String, Path, description = "Recipe UUID")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Updated", body = Recipe),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateRecipeRequest>,
) -> ApiResult<web::Json<Recipe>> {
    let id: RecipeId = parse_id(&path, RECIPE_ID)?;
    let UpdateRecipeRequest { name, description } = payload.into_inner();
    let changes =
        RecipeChanges::new(name, description).map_err(|err| recipe_validation_error(err, None))?;
    Ok(web::Json(state.recipes.update_recipe(id, changes).await?))
}

/// Add an ingredient line to a recipe.
#[utoipa::path(
    post,
    path = "/api/v1/recipes/{id}/ingredients",
    params(("id" = String, Path, description = "Recipe UUID")),
    request_body = IngredientRequest,
    responses(
        (status = 201, description = "Added", body = RecipeIngredient),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Recipe not found", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "addRecipeIngredient"
)]
#[post("/recipes/{id}/ingredients")]
pub async fn add_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<IngredientRequest>,
) -> ApiResult<HttpResponse> {
    let id: RecipeId = parse_id(&path, RECIPE_ID)?;
    let IngredientRequest { name, amount } = payload.into_inner();
    let draft =
        IngredientDraft::new(name, amount).map_err(|err| recipe_validation_error(err, None))?;
    let association = state.recipes.add_ingredient_to_recipe(id, draft).await?;
    Ok(HttpResponse::Created().json(association))
}

/// Remove an ingredient from a recipe. Removing an absent ingredient succeeds.
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}/ingredients/{ingredient_id}",
    params(
        ("id" = String, Path, description = "Recipe UUID"),
        ("ingredient_id" = String, Path, description = "Ingredient UUID")
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 400, description = "Invalid id", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "removeRecipeIngredient"
)]
#[delete("/recipes/{id}/ingredients/{ingredient_id}")]
pub async fn remove_ingredient(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_recipe_id, raw_ingredient_id) = path.into_inner();
    let recipe_id: RecipeId = parse_id(&raw_recipe_id, RECIPE_ID)?;
    let ingredient_id: IngredientId = parse_id(&raw_ingredient_id, INGREDIENT_ID)?;
    state
        .recipes
        .remove_ingredient_from_recipe(recipe_id, ingredient_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Recipes authored by one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/recipes",
    params(("user_id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "Recipes", body = [Recipe]),
        (status = 400, description = "Invalid id", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "listUserRecipes"
)]
#[get("/users/{user_id}/recipes")]
pub async fn list_user_recipes(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Recipe>>> {
    let user_id: UserId = parse_id(&path, USER_ID)?;
    Ok(web::Json(state.recipes.get_user_recipes(user_id).await?))
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
