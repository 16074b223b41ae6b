// ABOUTME: Durable recommendation plan storage keyed to predictions
// ABOUTME: Several rows may exist per prediction; reads resolve to the latest by creation time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{format_timestamp, page_bounds, parse_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::StoredRecommendation;
use crate::stores::RecommendationStore;
use async_trait::async_trait;
use chrono::Utc;
use heartcare_intelligence::DurablePlan;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::warn;

impl Database {
    pub(super) async fn migrate_recommendations(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS exercise_recommendations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                prediction_id INTEGER NOT NULL REFERENCES predictions(id) ON DELETE CASCADE,
                plan TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            "exercise_recommendations table",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_recommendations_prediction ON exercise_recommendations(prediction_id, created_at)",
            "recommendations prediction index",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_recommendations_patient ON exercise_recommendations(patient_id, created_at)",
            "recommendations patient index",
        )
        .await
    }
}

/// Database manager for stored recommendation plans
pub struct RecommendationManager {
    pool: SqlitePool,
}

const RECOMMENDATION_COLUMNS: &str = "id, patient_id, prediction_id, plan, created_at";

impl RecommendationManager {
    /// Create a new recommendation manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a durable plan for a prediction
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails
    pub async fn create_recommendation(
        &self,
        patient_id: i64,
        prediction_id: i64,
        plan: &DurablePlan,
    ) -> AppResult<StoredRecommendation> {
        let created_at = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO exercise_recommendations (patient_id, prediction_id, plan, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(patient_id)
        .bind(prediction_id)
        .bind(plan.to_json()?)
        .bind(format_timestamp(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recommendation: {e}")))?;

        Ok(StoredRecommendation {
            id,
            patient_id,
            prediction_id,
            plan: plan.clone(),
            created_at,
        })
    }

    /// The plan for a prediction; the most recently created row wins
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_by_prediction(
        &self,
        prediction_id: i64,
    ) -> AppResult<Option<StoredRecommendation>> {
        let row = sqlx::query(&format!(
            r"
            SELECT {RECOMMENDATION_COLUMNS} FROM exercise_recommendations
            WHERE prediction_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "
        ))
        .bind(prediction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recommendation: {e}")))?;

        row.map(|r| row_to_recommendation(&r)).transpose()
    }

    /// A patient's plans, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_patient(
        &self,
        patient_id: i64,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> AppResult<Vec<StoredRecommendation>> {
        let (limit, offset) = page_bounds(limit, offset);

        let rows = sqlx::query(&format!(
            r"
            SELECT {RECOMMENDATION_COLUMNS} FROM exercise_recommendations
            WHERE patient_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(patient_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list recommendations: {e}")))?;

        rows.iter().map(row_to_recommendation).collect()
    }

    /// A patient's most recent plan
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn latest_by_patient(
        &self,
        patient_id: i64,
    ) -> AppResult<Option<StoredRecommendation>> {
        Ok(self
            .list_by_patient(patient_id, Some(1), None)
            .await?
            .into_iter()
            .next())
    }
}

#[async_trait]
impl RecommendationStore for RecommendationManager {
    async fn create_recommendation(
        &self,
        patient_id: i64,
        prediction_id: i64,
        plan: &DurablePlan,
    ) -> AppResult<StoredRecommendation> {
        Self::create_recommendation(self, patient_id, prediction_id, plan).await
    }
}

fn row_to_recommendation(row: &SqliteRow) -> AppResult<StoredRecommendation> {
    let id: i64 = row.get("id");
    let plan_json: String = row.get("plan");
    let created_at_str: String = row.get("created_at");

    let plan = DurablePlan::from_json(&plan_json).unwrap_or_else(|e| {
        warn!(recommendation_id = id, error = %e, "Unreadable stored plan, treating as no plan");
        DurablePlan::default()
    });

    Ok(StoredRecommendation {
        id,
        patient_id: row.get("patient_id"),
        prediction_id: row.get("prediction_id"),
        plan,
        created_at: parse_timestamp(&created_at_str)?,
    })
}
