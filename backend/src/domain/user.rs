//! User data model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::ids::define_uuid_id;

define_uuid_id! {
    /// Stable user identifier.
    UserId
}

/// Validation errors for user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Name was blank.
    #[error("user name must not be empty")]
    EmptyName,
    /// Email did not look like an address.
    #[error("email must contain a single '@' with text on both sides")]
    InvalidEmail,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email, if provided.
    pub email: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: Option<String>,
}

impl NewUser {
    /// Validate user input. Names and emails are trimmed; a blank email is
    /// treated as absent.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::NewUser;
    ///
    /// let user = NewUser::new(" Ada ", Some("ada@example.com".into())).expect("valid user");
    /// assert_eq!(user.name(), "Ada");
    /// assert!(NewUser::new("Ada", Some("nope".into())).is_err());
    /// ```
    pub fn new(name: impl Into<String>, email: Option<String>) -> Result<Self, UserValidationError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let email = email
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty());
        if let Some(address) = email.as_deref() {
            if !is_plausible_email(address) {
                return Err(UserValidationError::InvalidEmail);
            }
        }
        Ok(Self { name, email })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contact email.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

fn is_plausible_email(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyName)]
    #[case("   ", UserValidationError::EmptyName)]
    fn blank_names_are_rejected(#[case] name: &str, #[case] expected: UserValidationError) {
        assert_eq!(NewUser::new(name, None), Err(expected));
    }

    #[rstest]
    #[case("a@b")]
    #[case("chef@example.com")]
    fn plausible_emails_are_accepted(#[case] email: &str) {
        let user = NewUser::new("Chef", Some(email.to_owned())).expect("valid email");
        assert_eq!(user.email(), Some(email));
    }

    #[rstest]
    #[case("@example.com")]
    #[case("chef@")]
    #[case("a@b@c")]
    #[case("chef")]
    fn malformed_emails_are_rejected(#[case] email: &str) {
        assert_eq!(
            NewUser::new("Chef", Some(email.to_owned())),
            Err(UserValidationError::InvalidEmail)
        );
    }

    #[rstest]
    fn blank_email_is_absent() {
        let user = NewUser::new("Chef", Some("  ".to_owned())).expect("blank email is allowed");
        assert_eq!(user.email(), None);
    }
}
