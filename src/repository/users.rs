//! Users repository for database operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::{map_unique_violation, UsersRepository};
use crate::{
    error::{AppError, AppResult},
    models::{CreateUser, User},
};

#[derive(Clone)]
pub struct PgUsersRepository {
    pool: Pool<Postgres>,
}

impl PgUsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersRepository for PgUsersRepository {
    async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id != $2)")
                .bind(email)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    async fn create(&self, user: &CreateUser) -> AppResult<User> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, surname, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Email {} is already registered", user.email)))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET name = $1, surname = $2, email = $3, updated_at = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(Utc::now())
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Email {} is already registered", user.email)))?
        .ok_or_else(|| AppError::UserNotFound(format!("User with id {} not found", user.id)))
    }

    async fn delete_releasing_books(&self, id: i32) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let released = sqlx::query(
            "UPDATE books SET owner_id = NULL, checked_out_at = NULL, updated_at = $2 WHERE owner_id = $1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            // Dropping the transaction rolls back the release
            return Err(AppError::UserNotFound(format!("User with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(released)
    }
}
