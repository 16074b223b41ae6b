// ABOUTME: SQLite database handle, connection setup and inline schema migrations
// ABOUTME: Exposes one manager per table family over a shared connection pool
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! The [`Database`] owns the `SQLite` pool and creates the schema at startup.
//! Each table family has a manager (`UserManager`, `PatientManager`, ...)
//! holding a clone of the pool, built on demand through accessor methods.

mod exercise_templates;
mod patients;
mod predictions;
mod recommendations;
mod stats;
mod users;

pub use exercise_templates::{ExerciseTemplateManager, TemplateInput};
pub use patients::{PatientManager, RiskFilter};
pub use predictions::PredictionManager;
pub use recommendations::RecommendationManager;
pub use stats::StatsManager;
pub use users::UserManager;

use crate::config::DatabaseUrl;
use crate::constants::limits::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Database handle shared by all managers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or a
    /// migration fails
    pub async fn new(url: &DatabaseUrl, max_connections: u32) -> AppResult<Self> {
        if let DatabaseUrl::SQLite { path } = url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::database(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let connect_options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives only as long as its single connection
        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %url, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_patients().await?;
        self.migrate_predictions().await?;
        self.migrate_exercise_templates().await?;
        self.migrate_recommendations().await?;
        Ok(())
    }

    /// Check the connection is usable
    ///
    /// # Errors
    ///
    /// Returns an error if a trivial query fails
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// User account operations
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Patient operations
    #[must_use]
    pub fn patients(&self) -> PatientManager {
        PatientManager::new(self.pool.clone())
    }

    /// Prediction operations
    #[must_use]
    pub fn predictions(&self) -> PredictionManager {
        PredictionManager::new(self.pool.clone())
    }

    /// Exercise template catalog operations
    #[must_use]
    pub fn exercise_templates(&self) -> ExerciseTemplateManager {
        ExerciseTemplateManager::new(self.pool.clone())
    }

    /// Stored recommendation operations
    #[must_use]
    pub fn recommendations(&self) -> RecommendationManager {
        RecommendationManager::new(self.pool.clone())
    }

    /// Aggregate statistics
    #[must_use]
    pub fn stats(&self) -> StatsManager {
        StatsManager::new(self.pool.clone())
    }

    async fn execute_ddl(&self, statement: &str, what: &str) -> AppResult<()> {
        sqlx::query(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create {what}: {e}")))?;
        Ok(())
    }
}

/// Fixed-width RFC3339 so that text ordering matches time ordering
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid datetime '{raw}': {e}")))
}

/// Clamp list paging parameters to the accepted range
pub(crate) fn page_bounds(limit: Option<u32>, offset: Option<u32>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    (i64::from(limit), i64::from(offset.unwrap_or(0)))
}
