//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book row, joined with its owner's email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub isbn: String,
    pub title: String,
    pub genre: String,
    pub author: String,
    pub language: String,
    pub price: Decimal,
    pub owner_id: Option<i32>,
    pub owner_email: Option<String>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Merge the fields present in `update`; absent fields keep their stored value.
    pub fn apply(&mut self, update: &UpdateBook) {
        if let Some(ref isbn) = update.isbn {
            self.isbn = isbn.clone();
        }
        if let Some(ref title) = update.title {
            self.title = title.clone();
        }
        if let Some(ref genre) = update.genre {
            self.genre = genre.clone();
        }
        if let Some(ref author) = update.author {
            self.author = author.clone();
        }
        if let Some(ref language) = update.language {
            self.language = language.clone();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
    }

    pub fn is_owned(&self) -> bool {
        self.owner_id.is_some()
    }
}

/// Create book request (JSON body or query string)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    /// Catalog identifier; derived from the other fields when omitted
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "Title must not be blank"))]
    pub title: String,
    #[serde(alias = "type")]
    #[validate(length(min = 1, message = "Genre must not be blank"))]
    pub genre: String,
    #[validate(length(min = 1, message = "Author must not be blank"))]
    pub author: String,
    #[validate(length(min = 1, message = "Language must not be blank"))]
    pub language: String,
    pub price: Decimal,
}

impl CreateBook {
    pub fn trimmed(mut self) -> Self {
        self.isbn = trim_opt(self.isbn).filter(|isbn| !isbn.is_empty());
        self.title = self.title.trim().to_string();
        self.genre = self.genre.trim().to_string();
        self.author = self.author.trim().to_string();
        self.language = self.language.trim().to_string();
        self
    }
}

/// Fields ready to be inserted, ISBN resolved
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub genre: String,
    pub author: String,
    pub language: String,
    pub price: Decimal,
}

impl From<CreateBook> for NewBook {
    fn from(book: CreateBook) -> Self {
        let isbn = book
            .isbn
            .unwrap_or_else(|| derive_isbn(&book.title, &book.genre, &book.author, &book.language));
        Self {
            isbn,
            title: book.title,
            genre: book.genre,
            author: book.author,
            language: book.language,
            price: book.price,
        }
    }
}

/// Partial update; only the fields that are set are written
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "ISBN must not be blank"))]
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "Title must not be blank"))]
    pub title: Option<String>,
    #[serde(alias = "type")]
    #[validate(length(min = 1, message = "Genre must not be blank"))]
    pub genre: Option<String>,
    #[validate(length(min = 1, message = "Author must not be blank"))]
    pub author: Option<String>,
    #[validate(length(min = 1, message = "Language must not be blank"))]
    pub language: Option<String>,
    pub price: Option<Decimal>,
}

impl UpdateBook {
    pub fn trimmed(self) -> Self {
        Self {
            isbn: trim_opt(self.isbn),
            title: trim_opt(self.title),
            genre: trim_opt(self.genre),
            author: trim_opt(self.author),
            language: trim_opt(self.language),
            price: self.price,
        }
    }
}

/// Book projection returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookView {
    pub isbn: String,
    pub title: String,
    pub genre: String,
    pub author: String,
    pub language: String,
    pub price: Decimal,
    /// Email of the current holder, `null` when the book is on the shelf
    pub owner: Option<String>,
    pub checked_out_at: Option<DateTime<Utc>>,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self {
            isbn: book.isbn,
            title: book.title,
            genre: book.genre,
            author: book.author,
            language: book.language,
            price: book.price,
            owner: book.owner_email,
            checked_out_at: book.checked_out_at,
        }
    }
}

/// Price must be strictly positive
pub fn validate_price(price: Decimal) -> AppResult<()> {
    if price <= Decimal::ZERO {
        return Err(AppError::InvalidPrice(price));
    }
    Ok(())
}

/// Catalog code used when a book is created without an ISBN:
/// two title characters, a dash, then the initials of genre, author and language.
///
/// The code is used as a path segment (`/books/:isbn`), so characters that
/// would need escaping there are replaced with `_`.
pub fn derive_isbn(title: &str, genre: &str, author: &str, language: &str) -> String {
    let mut code: String = title.chars().take(2).map(path_safe).collect();
    code.push('-');
    code.extend(genre.chars().take(1).map(path_safe));
    code.extend(author.chars().take(1).map(path_safe));
    code.extend(language.chars().take(1).map(path_safe));
    code
}

fn path_safe(c: char) -> char {
    if c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '~') {
        c
    } else {
        '_'
    }
}

fn trim_opt(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}
