//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::book::{Book, BookView};

/// User model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Merge the fields present in `update`; absent fields keep their stored value.
    pub fn apply(&mut self, update: &UpdateUser) {
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(ref surname) = update.surname {
            self.surname = surname.clone();
        }
        if let Some(ref email) = update.email {
            self.email = email.clone();
        }
    }
}

/// Create user request (JSON body or query string)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[serde(alias = "nome")]
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: String,
    #[serde(alias = "cognome")]
    #[validate(length(min = 1, message = "Surname must not be blank"))]
    pub surname: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

impl CreateUser {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            email: normalize_email(&self.email),
        }
    }
}

/// Update user request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[serde(alias = "nome")]
    #[validate(length(min = 1, message = "Name must not be blank"))]
    pub name: Option<String>,
    #[serde(alias = "cognome")]
    #[validate(length(min = 1, message = "Surname must not be blank"))]
    pub surname: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl UpdateUser {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            surname: self.surname.map(|s| s.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
        }
    }
}

/// User projection with the books currently held
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub books_in_possession: Vec<BookView>,
}

impl UserView {
    pub fn new(user: User, books: Vec<Book>) -> Self {
        Self {
            name: user.name,
            surname: user.surname,
            email: user.email,
            books_in_possession: books.into_iter().map(BookView::from).collect(),
        }
    }
}

/// Emails are compared trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
