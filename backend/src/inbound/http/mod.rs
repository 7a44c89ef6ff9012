//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod recipes;
pub mod state;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;
pub use validation::json_config;

/// Register every `/api/v1` handler on a scope or app.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use recipe_backend::inbound::http::{configure_api, json_config};
///
/// let app = App::new()
///     .app_data(json_config())
///     .service(web::scope("/api/v1").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(recipes::list_recipes)
        .service(recipes::get_recipe)
        .service(recipes::create_recipe)
        .service(recipes::update_recipe)
        .service(recipes::add_ingredient)
        .service(recipes::remove_ingredient)
        .service(recipes::list_user_recipes)
        .service(users::get_user)
        .service(users::create_user);
}
