// ABOUTME: Exercise template catalog storage and administration
// ABOUTME: Implements the read-only TemplateCatalog accessor over the exercise_templates table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{format_timestamp, Database};
use crate::catalog::TemplateCatalog;
use crate::errors::{AppError, AppResult, ErrorCode};
use async_trait::async_trait;
use chrono::Utc;
use heartcare_intelligence::{ExerciseTemplate, RiskLevel};
use serde::Deserialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

impl Database {
    pub(super) async fn migrate_exercise_templates(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS exercise_templates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                intensity TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                duration_min INTEGER NOT NULL CHECK (duration_min > 0),
                freq_per_week INTEGER NOT NULL CHECK (freq_per_week > 0),
                target_risk_level TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "exercise_templates table",
        )
        .await
    }
}

// ============================================================================
// Template Input
// ============================================================================

/// Administrative create/update payload for a template
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateInput {
    /// Display name
    pub name: String,
    /// Intensity label
    pub intensity: String,
    /// Description shown as plan notes
    #[serde(default)]
    pub description: String,
    /// Minutes per session
    pub duration_min: i32,
    /// Sessions per week
    pub freq_per_week: i32,
    /// Target risk level: low, medium, high, none, or empty for any
    #[serde(default)]
    pub target_risk_level: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TemplateInput {
    /// Validate and normalize: trims text and lower-cases the target risk level
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the offending field
    pub fn normalized(&self) -> AppResult<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::new(ErrorCode::MissingRequiredField, "name is required"));
        }
        let intensity = self.intensity.trim();
        if intensity.is_empty() {
            return Err(AppError::new(
                ErrorCode::MissingRequiredField,
                "intensity is required",
            ));
        }
        if self.duration_min <= 0 {
            return Err(AppError::out_of_range("duration_min must be positive"));
        }
        if self.freq_per_week <= 0 {
            return Err(AppError::out_of_range("freq_per_week must be positive"));
        }

        let target = self.target_risk_level.trim().to_lowercase();
        if !target.is_empty() && RiskLevel::from_label(&target).is_none() {
            return Err(AppError::invalid_input(
                "target_risk_level must be low/medium/high/none or empty",
            ));
        }

        Ok(Self {
            name: name.to_owned(),
            intensity: intensity.to_owned(),
            description: self.description.trim().to_owned(),
            duration_min: self.duration_min,
            freq_per_week: self.freq_per_week,
            target_risk_level: target,
            tags: self
                .tags
                .iter()
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect(),
        })
    }
}

// ============================================================================
// Exercise Template Manager
// ============================================================================

/// Database manager for the exercise template catalog
pub struct ExerciseTemplateManager {
    pool: SqlitePool,
}

const TEMPLATE_COLUMNS: &str =
    "id, name, intensity, description, duration_min, freq_per_week, target_risk_level, tags";

impl ExerciseTemplateManager {
    /// Create a new exercise template manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All templates in catalog order (by id)
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_templates(&self) -> AppResult<Vec<ExerciseTemplate>> {
        let rows = sqlx::query(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM exercise_templates ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list exercise templates: {e}")))?;

        rows.iter().map(row_to_template).collect()
    }

    /// Get a template by id
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_template(&self, id: i64) -> AppResult<Option<ExerciseTemplate>> {
        let row = sqlx::query(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM exercise_templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get exercise template: {e}")))?;

        row.map(|r| row_to_template(&r)).transpose()
    }

    /// Validate and insert a template
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or a database error if the
    /// insert fails
    pub async fn create_template(&self, input: &TemplateInput) -> AppResult<ExerciseTemplate> {
        let input = input.normalized()?;
        let now = format_timestamp(Utc::now());

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO exercise_templates
                (name, intensity, description, duration_min, freq_per_week,
                 target_risk_level, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.intensity)
        .bind(&input.description)
        .bind(input.duration_min)
        .bind(input.freq_per_week)
        .bind(&input.target_risk_level)
        .bind(serde_json::to_string(&input.tags)?)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create exercise template: {e}")))?;

        Ok(input_to_template(id, input))
    }

    /// Validate and replace a template's fields
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if no template has this id, a validation
    /// error for bad input, or a database error if the update fails
    pub async fn update_template(
        &self,
        id: i64,
        input: &TemplateInput,
    ) -> AppResult<ExerciseTemplate> {
        let input = input.normalized()?;

        let result = sqlx::query(
            r"
            UPDATE exercise_templates
            SET name = $1, intensity = $2, description = $3, duration_min = $4,
                freq_per_week = $5, target_risk_level = $6, tags = $7, updated_at = $8
            WHERE id = $9
            ",
        )
        .bind(&input.name)
        .bind(&input.intensity)
        .bind(&input.description)
        .bind(input.duration_min)
        .bind(input.freq_per_week)
        .bind(&input.target_risk_level)
        .bind(serde_json::to_string(&input.tags)?)
        .bind(format_timestamp(Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update exercise template: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Exercise template {id}")));
        }
        Ok(input_to_template(id, input))
    }

    /// Delete a template; plans that reference it simply stop resolving it
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete_template(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM exercise_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete exercise template: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TemplateCatalog for ExerciseTemplateManager {
    async fn list_templates(&self) -> AppResult<Vec<ExerciseTemplate>> {
        Self::list_templates(self)
            .await
            .map_err(|e| AppError::catalog_unavailable(e.message.clone()).with_source(e))
    }
}

fn input_to_template(id: i64, input: TemplateInput) -> ExerciseTemplate {
    ExerciseTemplate {
        id,
        name: input.name,
        intensity: input.intensity,
        description: input.description,
        duration_min: input.duration_min,
        freq_per_week: input.freq_per_week,
        target_risk_level: input.target_risk_level,
        tags: input.tags,
    }
}

fn row_to_template(row: &SqliteRow) -> AppResult<ExerciseTemplate> {
    let tags_json: String = row.get("tags");

    Ok(ExerciseTemplate {
        id: row.get("id"),
        name: row.get("name"),
        intensity: row.get("intensity"),
        description: row.get("description"),
        duration_min: row.get("duration_min"),
        freq_per_week: row.get("freq_per_week"),
        target_risk_level: row.get("target_risk_level"),
        tags: serde_json::from_str(&tags_json)?,
    })
}
