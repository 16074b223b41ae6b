// ABOUTME: User account database operations
// ABOUTME: Handles registration storage and lookup by email or id

use super::{format_timestamp, parse_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::User;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            "users table",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
            "users email index",
        )
        .await
    }
}

/// Database manager for user accounts
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user with an already hashed password
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is taken, or a database
    /// error if the insert fails
    pub async fn create_user(&self, email: &str, password_hash: &str) -> AppResult<User> {
        if self.get_user_by_email(email).await?.is_some() {
            return Err(AppError::already_exists(format!("User with email {email}")));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(format_timestamp(user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create user: {e}")))?;

        Ok(user)
    }

    /// Look up a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    /// Look up a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let row =
            sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE id = $1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| row_to_user(&r)).transpose()
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let id_str: String = row.get("id");
    let created_at_str: String = row.get("created_at");

    Ok(User {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| AppError::internal(format!("Invalid user id '{id_str}': {e}")))?,
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: parse_timestamp(&created_at_str)?,
    })
}
