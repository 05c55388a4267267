//! Data models for Libris

pub mod book;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookView, CreateBook, NewBook, UpdateBook};
pub use user::{CreateUser, UpdateUser, User, UserView};
