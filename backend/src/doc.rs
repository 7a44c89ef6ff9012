//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint in the inbound layer together
//! with the request and response schemas they reference. Swagger UI serves
//! the document in debug builds.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, Ingredient, Recipe, RecipeIngredient, User};
use crate::inbound::http::recipes::{CreateRecipeRequest, IngredientRequest, UpdateRecipeRequest};
use crate::inbound::http::users::CreateUserRequest;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Recipe backend API",
        description = "Recipes, their ingredients, and their authors."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::add_ingredient,
        crate::inbound::http::recipes::remove_ingredient,
        crate::inbound::http::recipes::list_user_recipes,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Recipe,
        RecipeIngredient,
        Ingredient,
        CreateRecipeRequest,
        UpdateRecipeRequest,
        IngredientRequest,
        CreateUserRequest
    )),
    tags(
        (name = "recipes", description = "Recipe and ingredient operations"),
        (name = "users", description = "Recipe authors"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
