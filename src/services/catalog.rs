//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{validate_price, Book, BookView, CreateBook, NewBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new book. The ISBN is derived when omitted and must be unique.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<BookView> {
        let book = book.trimmed();
        book.validate()?;
        if let Err(e) = validate_price(book.price) {
            tracing::warn!("Rejected book {:?}: invalid price {}", book.title, book.price);
            return Err(e);
        }

        let new_book = NewBook::from(book);
        if self.repository.books.get_by_isbn(&new_book.isbn).await?.is_some() {
            tracing::warn!("Book with ISBN {} already exists", new_book.isbn);
            return Err(AppError::AlreadyExists(format!(
                "Book with ISBN {} already exists",
                new_book.isbn
            )));
        }

        let created = self.repository.books.create(&new_book).await?;
        tracing::info!(isbn = %created.isbn, title = %created.title, "Book created");
        Ok(created.into())
    }

    /// Find a book by title and ISBN together
    pub async fn find_book(&self, title: &str, isbn: &str) -> AppResult<BookView> {
        let (title, isbn) = (title.trim(), isbn.trim());
        self.repository
            .books
            .get_by_title_and_isbn(title, isbn)
            .await?
            .map(BookView::from)
            .ok_or_else(|| {
                tracing::debug!("No book titled {:?} with ISBN {}", title, isbn);
                AppError::BookNotFound(format!("Book {:?} with ISBN {} not found", title, isbn))
            })
    }

    /// Get a book by ISBN
    pub async fn get_book(&self, isbn: &str) -> AppResult<BookView> {
        self.fetch(isbn).await.map(BookView::from)
    }

    /// Partially update a book; the resulting price is validated on every update
    pub async fn update_book(&self, isbn: &str, update: UpdateBook) -> AppResult<BookView> {
        let update = update.trimmed();
        update.validate()?;

        let isbn = isbn.trim();
        let mut book = self.fetch(isbn).await?;
        book.apply(&update);
        validate_price(book.price)?;

        if book.isbn != isbn {
            if let Some(other) = self.repository.books.get_by_isbn(&book.isbn).await? {
                if other.id != book.id {
                    return Err(AppError::AlreadyExists(format!(
                        "Book with ISBN {} already exists",
                        book.isbn
                    )));
                }
            }
        }

        let updated = self.repository.books.update(&book).await?;
        tracing::info!(isbn = %updated.isbn, "Book updated");
        Ok(updated.into())
    }

    /// Delete a book by ISBN
    pub async fn delete_book(&self, isbn: &str) -> AppResult<()> {
        let book = self.fetch(isbn).await?;
        self.repository.books.delete(book.id).await?;
        tracing::info!(isbn = %book.isbn, "Book deleted");
        Ok(())
    }

    async fn fetch(&self, isbn: &str) -> AppResult<Book> {
        let isbn = isbn.trim();
        self.repository
            .books
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::BookNotFound(format!("Book with ISBN {} not found", isbn)))
    }
}
