//! Repository layer for database operations

pub mod books;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{Book, CreateUser, NewBook, User},
};

/// Book storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksRepository: Send + Sync {
    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>>;

    async fn get_by_title_and_isbn(&self, title: &str, isbn: &str) -> AppResult<Option<Book>>;

    /// Books currently held by a user
    async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>>;

    async fn create(&self, book: &NewBook) -> AppResult<Book>;

    /// Write catalog fields back; ownership is left untouched
    async fn update(&self, book: &Book) -> AppResult<Book>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Set the owner if the book is unowned and the user holds fewer than
    /// `max_books`. Returns `None` when either condition no longer holds, and
    /// `UserNotFound` when the user row is gone.
    async fn assign_owner(&self, book_id: i32, owner_id: i32, max_books: i64) -> AppResult<Option<Book>>;

    /// Clear the owner if it is still `owner_id`. Returns `None` otherwise.
    async fn release_owner(&self, book_id: i32, owner_id: i32) -> AppResult<Option<Book>>;
}

/// User storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool>;

    async fn create(&self, user: &CreateUser) -> AppResult<User>;

    async fn update(&self, user: &User) -> AppResult<User>;

    /// Release every book held by the user, then remove the user, in one
    /// transaction. Returns the number of released books.
    async fn delete_releasing_books(&self, id: i32) -> AppResult<u64>;
}

/// Main repository struct holding the storage backends
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BooksRepository>,
    pub users: Arc<dyn UsersRepository>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool.clone())),
            users: Arc::new(users::PgUsersRepository::new(pool)),
        }
    }

    /// Assemble a repository from explicit backends
    pub fn from_parts(books: Arc<dyn BooksRepository>, users: Arc<dyn UsersRepository>) -> Self {
        Self { books, users }
    }
}

/// Turn a unique-constraint violation into `AlreadyExists`, pass anything else through
pub(crate) fn map_unique_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::AlreadyExists(message())
        }
        _ => AppError::Database(err),
    }
}
