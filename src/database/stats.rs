// ABOUTME: Aggregate statistics over a user's patients and predictions
// ABOUTME: Risk distribution counts each patient once, by their latest prediction

use crate::errors::{AppError, AppResult};
use crate::models::RiskCount;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Database manager for dashboard statistics
pub struct StatsManager {
    pool: SqlitePool,
}

impl StatsManager {
    /// Create a new stats manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of patients owned by the user
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn total_patients(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM patients WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count patients: {e}")))
    }

    /// Number of predictions across the user's patients
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn total_predictions(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM predictions pr
            JOIN patients p ON p.id = pr.patient_id
            WHERE p.user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count predictions: {e}")))
    }

    /// Patients per latest-prediction risk label, largest group first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn risk_distribution(&self, user_id: Uuid) -> AppResult<Vec<RiskCount>> {
        let rows = sqlx::query(
            r"
            SELECT lower(lp.risk_label) AS risk_label, COUNT(*) AS count
            FROM patients p
            JOIN predictions lp ON lp.id = (
                SELECT id FROM predictions
                WHERE patient_id = p.id
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            WHERE p.user_id = $1
            GROUP BY lower(lp.risk_label)
            ORDER BY count DESC, risk_label ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to compute risk distribution: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| RiskCount {
                risk_label: row.get("risk_label"),
                count: row.get("count"),
            })
            .collect())
    }
}
