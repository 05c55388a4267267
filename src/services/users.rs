//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{normalize_email, CreateUser, UpdateUser, User, UserView},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new user; the email must not be taken
    pub async fn create_user(&self, user: CreateUser) -> AppResult<UserView> {
        let user = user.normalized();
        user.validate()?;

        if self.repository.users.email_exists(&user.email, None).await? {
            tracing::warn!("Email {} is already registered", user.email);
            return Err(AppError::AlreadyExists(format!(
                "Email {} is already registered",
                user.email
            )));
        }

        let created = self.repository.users.create(&user).await?;
        tracing::info!(email = %created.email, "User created");
        Ok(UserView::new(created, Vec::new()))
    }

    /// Get a user with the books they hold
    pub async fn find_user(&self, email: &str) -> AppResult<UserView> {
        let user = self.fetch(email).await?;
        self.view(user).await
    }

    /// Partially update name, surname and email
    pub async fn update_user(&self, email: &str, update: UpdateUser) -> AppResult<UserView> {
        let update = update.normalized();
        update.validate()?;

        let mut user = self.fetch(email).await?;

        if let Some(ref new_email) = update.email {
            if *new_email != user.email
                && self.repository.users.email_exists(new_email, Some(user.id)).await?
            {
                return Err(AppError::AlreadyExists(format!(
                    "Email {} is already registered",
                    new_email
                )));
            }
        }

        user.apply(&update);
        let updated = self.repository.users.update(&user).await?;
        tracing::info!(email = %updated.email, "User updated");
        self.view(updated).await
    }

    /// Partially update name and surname; the email itself is only a lookup key here
    pub async fn update_user_params(
        &self,
        email: &str,
        name: Option<String>,
        surname: Option<String>,
    ) -> AppResult<UserView> {
        self.update_user(
            email,
            UpdateUser {
                name,
                surname,
                email: None,
            },
        )
        .await
    }

    /// Delete a user after releasing every book they hold.
    /// Returns the number of released books.
    pub async fn delete_user(&self, email: &str) -> AppResult<u64> {
        let user = self.fetch(email).await?;
        let released = self.repository.users.delete_releasing_books(user.id).await?;
        tracing::info!(email = %user.email, released, "User deleted");
        Ok(released)
    }

    async fn fetch(&self, email: &str) -> AppResult<User> {
        let email = normalize_email(email);
        self.repository
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| {
                tracing::debug!("No user with email {}", email);
                AppError::UserNotFound(format!("No user registered with email {}", email))
            })
    }

    async fn view(&self, user: User) -> AppResult<UserView> {
        let books = self.repository.books.list_by_owner(user.id).await?;
        Ok(UserView::new(user, books))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        models::{book::tests::sample_book, user::tests::sample_user},
        repository::{MockBooksRepository, MockUsersRepository},
    };

    fn service(books: MockBooksRepository, users: MockUsersRepository) -> UsersService {
        UsersService::new(Repository::from_parts(Arc::new(books), Arc::new(users)))
    }

    fn create_request(email: &str) -> CreateUser {
        CreateUser {
            name: "Bilbo".to_string(),
            surname: "Baggins".to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_user_normalizes_email() {
        let mut users = MockUsersRepository::new();
        users
            .expect_email_exists()
            .withf(|email, exclude| email == "bilbo@shire.me" && exclude.is_none())
            .returning(|_, _| Ok(false));
        users
            .expect_create()
            .times(1)
            .returning(|user| Ok(sample_user(1, &user.email)));

        let view = service(MockBooksRepository::new(), users)
            .create_user(create_request(" Bilbo@Shire.me "))
            .await
            .unwrap();
        assert_eq!(view.email, "bilbo@shire.me");
        assert!(view.books_in_possession.is_empty());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let mut users = MockUsersRepository::new();
        users.expect_email_exists().returning(|_, _| Ok(true));
        users.expect_create().never();

        let err = service(MockBooksRepository::new(), users)
            .create_user(create_request("bilbo@shire.me"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_email() {
        let err = service(MockBooksRepository::new(), MockUsersRepository::new())
            .create_user(create_request("bilbo"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_find_user_lists_held_books() {
        let mut users = MockUsersRepository::new();
        users
            .expect_get_by_email()
            .returning(|email| Ok(Some(sample_user(4, email))));
        let mut books = MockBooksRepository::new();
        books
            .expect_list_by_owner()
            .withf(|owner| *owner == 4)
            .returning(|_| Ok(vec![sample_book(1, "a", "A"), sample_book(2, "b", "B")]));

        let view = service(books, users).find_user("bilbo@shire.me").await.unwrap();
        assert_eq!(view.books_in_possession.len(), 2);
    }

    #[tokio::test]
    async fn test_find_user_not_found() {
        let mut users = MockUsersRepository::new();
        users.expect_get_by_email().returning(|_| Ok(None));

        let err = service(MockBooksRepository::new(), users)
            .find_user("ghost@shire.me")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_params_only_touches_given_fields() {
        let mut users = MockUsersRepository::new();
        users
            .expect_get_by_email()
            .returning(|email| Ok(Some(sample_user(4, email))));
        users.expect_email_exists().never();
        users.expect_update().times(1).returning(|user| Ok(user.clone()));
        let mut books = MockBooksRepository::new();
        books.expect_list_by_owner().returning(|_| Ok(Vec::new()));

        let view = service(books, users)
            .update_user_params("bilbo@shire.me", Some("Frodo".to_string()), None)
            .await
            .unwrap();
        assert_eq!(view.name, "Frodo");
        assert_eq!(view.surname, "Baggins");
        assert_eq!(view.email, "bilbo@shire.me");
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let mut users = MockUsersRepository::new();
        users
            .expect_get_by_email()
            .returning(|email| Ok(Some(sample_user(4, email))));
        users
            .expect_email_exists()
            .withf(|email, exclude| email == "frodo@shire.me" && *exclude == Some(4))
            .returning(|_, _| Ok(true));
        users.expect_update().never();

        let err = service(MockBooksRepository::new(), users)
            .update_user(
                "bilbo@shire.me",
                UpdateUser {
                    email: Some("Frodo@Shire.me".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_delete_user_releases_books() {
        let mut users = MockUsersRepository::new();
        users
            .expect_get_by_email()
            .returning(|email| Ok(Some(sample_user(4, email))));
        users
            .expect_delete_releasing_books()
            .withf(|id| *id == 4)
            .times(1)
            .returning(|_| Ok(3));

        let released = service(MockBooksRepository::new(), users)
            .delete_user("bilbo@shire.me")
            .await
            .unwrap();
        assert_eq!(released, 3);
    }

    #[tokio::test]
    async fn test_delete_unknown_user() {
        let mut users = MockUsersRepository::new();
        users.expect_get_by_email().returning(|_| Ok(None));
        users.expect_delete_releasing_books().never();

        let err = service(MockBooksRepository::new(), users)
            .delete_user("ghost@shire.me")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }
}
