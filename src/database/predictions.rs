// ABOUTME: Prediction database operations; rows are immutable once written
// ABOUTME: Raw scorer features and factor annotations are stored as JSON text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{format_timestamp, page_bounds, parse_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{NewPrediction, Prediction, RiskFactor};
use crate::stores::PredictionStore;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_predictions(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS predictions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
                probability REAL NOT NULL,
                risk_label TEXT NOT NULL,
                raw_features TEXT NOT NULL,
                factors TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            )
            ",
            "predictions table",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_predictions_patient_created ON predictions(patient_id, created_at)",
            "predictions patient index",
        )
        .await
    }
}

/// Database manager for predictions
pub struct PredictionManager {
    pool: SqlitePool,
}

const PREDICTION_COLUMNS: &str =
    "id, patient_id, probability, risk_label, raw_features, factors, created_at";

impl PredictionManager {
    /// Create a new prediction manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a prediction
    ///
    /// # Errors
    ///
    /// Returns a database error if the insert fails
    pub async fn create_prediction(&self, prediction: &NewPrediction) -> AppResult<Prediction> {
        let created_at = Utc::now();
        let raw_features = serde_json::to_string(&prediction.raw_features)?;
        let factors = serde_json::to_string(&prediction.factors)?;

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO predictions (patient_id, probability, risk_label, raw_features, factors, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(prediction.patient_id)
        .bind(prediction.probability)
        .bind(&prediction.risk_label)
        .bind(&raw_features)
        .bind(&factors)
        .bind(format_timestamp(created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create prediction: {e}")))?;

        Ok(Prediction {
            id,
            patient_id: prediction.patient_id,
            probability: prediction.probability,
            risk_label: prediction.risk_label.clone(),
            raw_features: prediction.raw_features.clone(),
            factors: prediction.factors.clone(),
            created_at,
        })
    }

    /// Get a prediction by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_prediction(&self, id: i64) -> AppResult<Option<Prediction>> {
        let row = sqlx::query(&format!(
            "SELECT {PREDICTION_COLUMNS} FROM predictions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get prediction: {e}")))?;

        row.map(|r| row_to_prediction(&r)).transpose()
    }

    /// List a patient's predictions, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_patient(
        &self,
        patient_id: i64,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> AppResult<Vec<Prediction>> {
        let (limit, offset) = page_bounds(limit, offset);

        let rows = sqlx::query(&format!(
            r"
            SELECT {PREDICTION_COLUMNS} FROM predictions
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
        .map_err(|e| AppError::database(format!("Failed to list predictions: {e}")))?;

        rows.iter().map(row_to_prediction).collect()
    }

    /// A patient's most recent predictions up to `limit`, newest first, without paging clamps
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn history(&self, patient_id: i64, limit: u32) -> AppResult<Vec<Prediction>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {PREDICTION_COLUMNS} FROM predictions
            WHERE patient_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "
        ))
        .bind(patient_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load prediction history: {e}")))?;

        rows.iter().map(row_to_prediction).collect()
    }

    /// A patient's most recent prediction
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn latest_by_patient(&self, patient_id: i64) -> AppResult<Option<Prediction>> {
        Ok(self.history(patient_id, 1).await?.into_iter().next())
    }
}

#[async_trait]
impl PredictionStore for PredictionManager {
    async fn create_prediction(&self, prediction: &NewPrediction) -> AppResult<Prediction> {
        Self::create_prediction(self, prediction).await
    }
}

fn row_to_prediction(row: &SqliteRow) -> AppResult<Prediction> {
    let raw_features_json: String = row.get("raw_features");
    let factors_json: String = row.get("factors");
    let created_at_str: String = row.get("created_at");

    let factors: Vec<RiskFactor> = serde_json::from_str(&factors_json)?;

    Ok(Prediction {
        id: row.get("id"),
        patient_id: row.get("patient_id"),
        probability: row.get("probability"),
        risk_label: row.get("risk_label"),
        raw_features: serde_json::from_str(&raw_features_json)?,
        factors,
        created_at: parse_timestamp(&created_at_str)?,
    })
}
