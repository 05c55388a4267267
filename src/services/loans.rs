//! Checkout and return of books

use crate::{
    error::{AppError, AppResult},
    models::{user::normalize_email, Book, User, UserView},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    max_books: usize,
}

impl LoansService {
    pub fn new(repository: Repository, max_books: usize) -> Self {
        Self {
            repository,
            max_books,
        }
    }

    /// Make `email` the owner of the book identified by title and ISBN
    pub async fn checkout(&self, email: &str, title: &str, isbn: &str) -> AppResult<UserView> {
        let (title, isbn) = (title.trim(), isbn.trim());
        let user = self.user(email).await?;
        let mut held = self.repository.books.list_by_owner(user.id).await?;

        if held.len() >= self.max_books {
            tracing::warn!("User {} already holds {} books", user.email, held.len());
            return Err(self.max_books_error(&user));
        }

        let book = self
            .repository
            .books
            .get_by_title_and_isbn(title, isbn)
            .await?
            .ok_or_else(|| {
                AppError::BookNotFound(format!("Book {:?} with ISBN {} not found", title, isbn))
            })?;

        if book.is_owned() {
            return Err(unavailable(&book));
        }

        let max_books = i64::try_from(self.max_books)
            .map_err(|_| AppError::Internal("max_books does not fit in i64".to_string()))?;

        match self
            .repository
            .books
            .assign_owner(book.id, user.id, max_books)
            .await?
        {
            Some(assigned) => {
                tracing::info!(email = %user.email, isbn = %assigned.isbn, "Book checked out");
                held.push(assigned);
                Ok(UserView::new(user, held))
            }
            None => {
                // Lost a race: either the book was taken or the user hit the limit meanwhile
                let current = self.repository.books.get_by_isbn(&book.isbn).await?;
                match current {
                    Some(b) if b.is_owned() => Err(unavailable(&b)),
                    Some(_) => Err(self.max_books_error(&user)),
                    None => Err(AppError::BookNotFound(format!(
                        "Book with ISBN {} not found",
                        book.isbn
                    ))),
                }
            }
        }
    }

    /// Give back a held book, matched by title and, when given, ISBN
    pub async fn return_book(&self, email: &str, title: &str, isbn: Option<&str>) -> AppResult<UserView> {
        let (title, isbn) = (title.trim(), isbn.map(str::trim));
        let user = self.user(email).await?;
        let mut held = self.repository.books.list_by_owner(user.id).await?;

        let position = held
            .iter()
            .position(|b| b.title == title && isbn.map_or(true, |i| b.isbn == i))
            .ok_or_else(|| {
                tracing::warn!("Book {:?} is not held by {}", title, user.email);
                not_in_possession(title, &user)
            })?;

        let book = held.remove(position);
        if self
            .repository
            .books
            .release_owner(book.id, user.id)
            .await?
            .is_none()
        {
            return Err(not_in_possession(title, &user));
        }

        tracing::info!(email = %user.email, isbn = %book.isbn, "Book returned");
        Ok(UserView::new(user, held))
    }

    async fn user(&self, email: &str) -> AppResult<User> {
        let email = normalize_email(email);
        self.repository
            .users
            .get_by_email(&email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("No user registered with email {}", email)))
    }

    fn max_books_error(&self, user: &User) -> AppError {
        AppError::MaxBooks {
            email: user.email.clone(),
            limit: self.max_books,
        }
    }
}

fn unavailable(book: &Book) -> AppError {
    AppError::BookUnavailable(format!("Book with ISBN {} is already checked out", book.isbn))
}

fn not_in_possession(title: &str, user: &User) -> AppError {
    AppError::NotInPossession(format!("Book {:?} is not held by {}", title, user.email))
}
