//! User domain service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{UserRepository, UserRepositoryError, UserService};
use crate::domain::{Error, NewUser, User, UserId};

fn map_repository_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}

/// Pass-through user service over a [`UserRepository`].
pub struct UserServiceImpl<R: ?Sized> {
    user_repo: Arc<R>,
}

impl<R: ?Sized> UserServiceImpl<R> {
    /// Create a service backed by `user_repo`.
    pub fn new(user_repo: Arc<R>) -> Self {
        Self { user_repo }
    }
}

#[async_trait]
impl<R> UserService for UserServiceImpl<R>
where
    R: UserRepository + ?Sized,
{
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, Error> {
        self.user_repo
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        self.user_repo
            .create(&user)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserRepository;
    use chrono::Utc;
    use rstest::rstest;

    fn user(id: UserId) -> User {
        User {
            id,
            name: "Chef".into(),
            email: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_user_passes_id_through() {
        let id = UserId::random();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .withf(move |candidate| *candidate == id)
            .times(1)
            .return_once(move |_| Ok(Some(user(id))));

        let service = UserServiceImpl::new(Arc::new(repo));
        let found = service.get_user_by_id(id).await.expect("lookup succeeds");

        assert_eq!(found.map(|user| user.id), Some(id));
    }

    #[tokio::test]
    async fn create_user_returns_stored_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|new_user| new_user.name() == "Chef")
            .times(1)
            .return_once(|_| Ok(user(UserId::random())));

        let service = UserServiceImpl::new(Arc::new(repo));
        let created = service
            .create_user(NewUser::new("Chef", None).expect("valid user"))
            .await
            .expect("create succeeds");

        assert_eq!(created.name, "Chef");
    }

    #[rstest]
    #[case(UserRepositoryError::connection("pool timed out"), ErrorCode::ServiceUnavailable)]
    #[case(UserRepositoryError::query("syntax error"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn repository_errors_are_mapped(
        #[case] failure: UserRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .return_once(move |_| Err(failure));

        let service = UserServiceImpl::new(Arc::new(repo));
        let error = service
            .get_user_by_id(UserId::random())
            .await
            .expect_err("lookup fails");

        assert_eq!(error.code(), expected);
    }
}
