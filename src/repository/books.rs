//! Books repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::{map_unique_violation, BooksRepository};
use crate::{
    error::{AppError, AppResult},
    models::{Book, NewBook},
};

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.isbn, b.title, b.genre, b.author, b.language, b.price,
           b.owner_id, u.email AS owner_email, b.checked_out_at,
           b.created_at, b.updated_at
    FROM books b
    LEFT JOIN users u ON u.id = b.owner_id
"#;

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("{BOOK_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::BookNotFound(format!("Book with id {} not found", id)))
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!("{BOOK_SELECT} WHERE b.isbn = $1"))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn get_by_title_and_isbn(&self, title: &str, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "{BOOK_SELECT} WHERE b.title = $1 AND b.isbn = $2"
        ))
        .bind(title)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "{BOOK_SELECT} WHERE b.owner_id = $1 ORDER BY b.checked_out_at, b.id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let now = Utc::now();

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (isbn, title, genre, author, language, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.price)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Book with ISBN {} already exists", book.isbn)))?;

        self.get_by_id(id).await
    }

    async fn update(&self, book: &Book) -> AppResult<Book> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE books SET
                isbn = $1, title = $2, genre = $3, author = $4,
                language = $5, price = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.genre)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.price)
        .bind(now)
        .bind(book.id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Book with ISBN {} already exists", book.isbn)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::BookNotFound(format!("Book with ISBN {} not found", book.isbn)));
        }

        self.get_by_id(book.id).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::BookNotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn assign_owner(&self, book_id: i32, owner_id: i32, max_books: i64) -> AppResult<Option<Book>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Serializes checkouts of the same user so the count below stays accurate
        sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::UserNotFound(format!("User with id {} not found", owner_id)))?;

        let assigned = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE books SET owner_id = $2, checked_out_at = $4, updated_at = $4
            WHERE id = $1
              AND owner_id IS NULL
              AND (SELECT COUNT(*) FROM books WHERE owner_id = $2) < $3
            RETURNING id
            "#,
        )
        .bind(book_id)
        .bind(owner_id)
        .bind(max_books)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        match assigned {
            Some(id) => Ok(Some(self.get_by_id(id).await?)),
            None => Ok(None),
        }
    }

    async fn release_owner(&self, book_id: i32, owner_id: i32) -> AppResult<Option<Book>> {
        let released = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE books SET owner_id = NULL, checked_out_at = NULL, updated_at = $3
            WHERE id = $1 AND owner_id = $2
            RETURNING id
            "#,
        )
        .bind(book_id)
        .bind(owner_id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        match released {
            Some(id) => Ok(Some(self.get_by_id(id).await?)),
            None => Ok(None),
        }
    }
}
