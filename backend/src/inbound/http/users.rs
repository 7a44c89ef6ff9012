//! Users API handlers.
//!
//! ```text
//! GET  /api/v1/users/{id}
//! POST /api/v1/users {"name":"Ada","email":"ada@example.com"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, NewUser, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, user_validation_error};

/// Request body for `POST /api/v1/users`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Fetch a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id: UserId = parse_id(&path, FieldName::new("userId"))?;
    state.users.get_user_by_id(id).await?.map(web::Json).ok_or_else(|| {
        Error::not_found(format!("user {id} not found")).with_details(json!({ "userId": id }))
    })
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let CreateUserRequest { name, email } = payload.into_inner();
    let new_user = NewUser::new(name, email).map_err(user_validation_error)?;
    let user = state.users.create_user(new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockRecipeService, MockUserService};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    fn user(id: UserId) -> User {
        User {
            id,
            name: "Ada".into(),
            email: Some("ada@example.com".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn call(users: MockUserService, request: actix_test::TestRequest) -> (StatusCode, Value) {
        let state = HttpState::new(Arc::new(MockRecipeService::new()), Arc::new(users));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(crate::inbound::http::json_config())
                .service(web::scope("/api/v1").service(get_user).service(create_user)),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[actix_web::test]
    async fn get_user_returns_the_user() {
        let id = UserId::random();
        let mut users = MockUserService::new();
        users
            .expect_get_user_by_id()
            .withf(move |requested| *requested == id)
            .return_once(move |id| Ok(Some(user(id))));

        let (status, body) = call(
            users,
            actix_test::TestRequest::get().uri(&format!("/api/v1/users/{id}")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.to_string());
        assert_eq!(body["email"], "ada@example.com");
    }

    #[actix_web::test]
    async fn missing_user_is_not_found() {
        let mut users = MockUserService::new();
        users.expect_get_user_by_id().return_once(|_| Ok(None));

        let (status, body) = call(
            users,
            actix_test::TestRequest::get().uri(&format!("/api/v1/users/{}", UserId::random())),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[actix_web::test]
    async fn malformed_id_is_rejected_before_the_service() {
        let users = MockUserService::new();

        let (status, body) = call(
            users,
            actix_test::TestRequest::get().uri("/api/v1/users/not-a-uuid"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["code"], "invalid_uuid");
    }

    #[actix_web::test]
    async fn create_user_trims_and_returns_created() {
        let mut users = MockUserService::new();
        users
            .expect_create_user()
            .withf(|new_user| new_user.name() == "Ada" && new_user.email().is_none())
            .return_once(|new_user| {
                let mut created = user(UserId::random());
                created.name = new_user.name().to_owned();
                created.email = None;
                Ok(created)
            });

        let (status, body) = call(
            users,
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(json!({ "name": "  Ada  ", "email": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Ada");
    }

    #[rstest]
    #[case(json!({ "name": " " }), "name")]
    #[case(json!({ "name": "Ada", "email": "ada.example.com" }), "email")]
    #[actix_web::test]
    async fn invalid_user_input_is_a_bad_request(#[case] payload: Value, #[case] field: &str) {
        let (status, body) = call(
            MockUserService::new(),
            actix_test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(payload),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
    }
}
