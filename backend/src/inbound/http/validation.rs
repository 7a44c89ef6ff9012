//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details name the
//! offending field and a stable machine-readable code.

use std::str::FromStr;

use actix_web::web;
use serde_json::json;

use crate::domain::{Error, RecipeValidationError, UserValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    EmptyName,
    EmptyAmount,
    InvalidEmail,
    MalformedBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::EmptyName => "empty_name",
            ErrorCode::EmptyAmount => "empty_amount",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::MalformedBody => "malformed_body",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
        "field": name,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Parse a UUID-backed identifier from a path or body value.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| invalid_uuid_error(field, value))
}

/// Map recipe input validation onto request fields.
///
/// `index` locates the ingredient within a create request's list.
pub(crate) fn recipe_validation_error(err: RecipeValidationError, index: Option<usize>) -> Error {
    let (field, code) = match err {
        RecipeValidationError::EmptyName => ("name", ErrorCode::EmptyName),
        RecipeValidationError::EmptyIngredientName => match index {
            Some(_) => ("ingredients.name", ErrorCode::EmptyName),
            None => ("name", ErrorCode::EmptyName),
        },
        RecipeValidationError::EmptyAmount => match index {
            Some(_) => ("ingredients.amount", ErrorCode::EmptyAmount),
            None => ("amount", ErrorCode::EmptyAmount),
        },
    };
    let mut details = json!({ "field": field, "code": code.as_str() });
    if let Some(index) = index {
        details["index"] = json!(index);
    }
    Error::invalid_request(err.to_string()).with_details(details)
}

pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    match err {
        UserValidationError::EmptyName => {
            field_error(FieldName::new("name"), ErrorCode::EmptyName, err.to_string())
        }
        UserValidationError::InvalidEmail => {
            field_error(FieldName::new("email"), ErrorCode::InvalidEmail, err.to_string())
        }
    }
}

/// JSON extractor configuration that reports malformed bodies in the shared
/// error schema.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        field_error(FieldName::new("body"), ErrorCode::MalformedBody, message).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecipeId;
    use rstest::rstest;

    #[rstest]
    fn parse_id_accepts_uuids() {
        let id: RecipeId =
            parse_id("3fa85f64-5717-4562-b3fc-2c963f66afa6", FieldName::new("id")).expect("uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[rstest]
    fn parse_id_reports_field_and_value() {
        let err = parse_id::<RecipeId>("nope", FieldName::new("recipeId")).expect_err("invalid");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "recipeId");
        assert_eq!(details["value"], "nope");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case(RecipeValidationError::EmptyName, None, "name", "empty_name")]
    #[case(RecipeValidationError::EmptyIngredientName, None, "name", "empty_name")]
    #[case(RecipeValidationError::EmptyAmount, None, "amount", "empty_amount")]
    #[case(RecipeValidationError::EmptyAmount, Some(2), "ingredients.amount", "empty_amount")]
    fn recipe_errors_name_the_field(
        #[case] err: RecipeValidationError,
        #[case] index: Option<usize>,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let error = recipe_validation_error(err, index);
        let details = error.details().expect("details");
        assert_eq!(details["field"], field);
        assert_eq!(details["code"], code);
        assert_eq!(details.get("index").and_then(|v| v.as_u64()), index.map(|i| i as u64));
    }

    #[rstest]
    fn invalid_email_points_at_email() {
        let error = user_validation_error(UserValidationError::InvalidEmail);
        assert_eq!(error.details().expect("details")["field"], "email");
    }
}
