//! Driving port for user operations.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserId};

/// User operations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// Look up a user; `None` when absent.
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, Error>;

    /// Register a user.
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;
}
