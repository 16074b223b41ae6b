// ABOUTME: Patient database operations with ownership-scoped listing
// ABOUTME: Listing joins each patient with their most recent prediction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{format_timestamp, page_bounds, parse_timestamp, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{Gender, NewPatient, Patient, PatientSummary, PatientUpdate, PredictionSummary};
use chrono::{NaiveDate, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

impl Database {
    pub(super) async fn migrate_patients(&self) -> AppResult<()> {
        self.execute_ddl(
            r"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                gender INTEGER NOT NULL CHECK (gender IN (1, 2, 3)),
                dob TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "patients table",
        )
        .await?;

        self.execute_ddl(
            "CREATE INDEX IF NOT EXISTS idx_patients_user_id ON patients(user_id)",
            "patients user index",
        )
        .await
    }
}

/// Filter on the risk label of a patient's latest prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskFilter {
    /// Patients with no prediction yet
    Unscored,
    /// Patients whose latest label matches, case-insensitively
    Label(String),
}

/// Database manager for patients
pub struct PatientManager {
    pool: SqlitePool,
}

const PATIENT_COLUMNS: &str = "p.id, p.user_id, p.name, p.gender, p.dob, p.created_at, p.updated_at";

impl PatientManager {
    /// Create a new patient manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a patient owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create_patient(&self, user_id: Uuid, patient: &NewPatient) -> AppResult<Patient> {
        let now = format_timestamp(Utc::now());

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO patients (user_id, name, gender, dob, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            ",
        )
        .bind(user_id.to_string())
        .bind(&patient.name)
        .bind(patient.gender.code())
        .bind(patient.dob.to_string())
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create patient: {e}")))?;

        self.get_patient(id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Patient {id} missing after insert")))
    }

    /// Get a patient by id, regardless of owner
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_patient(&self, id: i64) -> AppResult<Option<Patient>> {
        let row = sqlx::query(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get patient: {e}")))?;

        row.map(|r| row_to_patient(&r)).transpose()
    }

    /// List a user's patients with their latest prediction, newest patients first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_patients(
        &self,
        user_id: Uuid,
        risk: Option<&RiskFilter>,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> AppResult<Vec<PatientSummary>> {
        let (limit, offset) = page_bounds(limit, offset);

        let risk_clause = match risk {
            None => "",
            Some(RiskFilter::Unscored) => "AND lp.id IS NULL",
            Some(RiskFilter::Label(_)) => "AND lower(lp.risk_label) = $4",
        };

        let query = format!(
            r"
            SELECT {PATIENT_COLUMNS},
                   lp.id AS prediction_id, lp.probability, lp.risk_label,
                   lp.created_at AS prediction_created_at
            FROM patients p
            LEFT JOIN predictions lp ON lp.id = (
                SELECT id FROM predictions
                WHERE patient_id = p.id
                ORDER BY created_at DESC, id DESC
                LIMIT 1
            )
            WHERE p.user_id = $1 {risk_clause}
            ORDER BY p.id DESC
            LIMIT $2 OFFSET $3
            "
        );

        let mut sql_query = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(limit)
            .bind(offset);
        if let Some(RiskFilter::Label(label)) = risk {
            sql_query = sql_query.bind(label.to_lowercase());
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list patients: {e}")))?;

        rows.iter().map(row_to_patient_summary).collect()
    }

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the patient does not exist, or a
    /// database error if the update fails
    pub async fn update_patient(&self, id: i64, update: &PatientUpdate) -> AppResult<Patient> {
        let current = self
            .get_patient(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Patient {id}")))?;

        let name = update.name.as_ref().unwrap_or(&current.name);
        let gender = update.gender.unwrap_or(current.gender);
        let dob = update.dob.unwrap_or(current.dob);

        sqlx::query(
            r"
            UPDATE patients
            SET name = $1, gender = $2, dob = $3, updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(name)
        .bind(gender.code())
        .bind(dob.to_string())
        .bind(format_timestamp(Utc::now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update patient: {e}")))?;

        self.get_patient(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Patient {id}")))
    }

    /// Delete a patient and, through cascading keys, their predictions and plans
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete_patient(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete patient: {e}")))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_patient(row: &SqliteRow) -> AppResult<Patient> {
    let user_id_str: String = row.get("user_id");
    let gender_code: i64 = row.get("gender");
    let dob_str: String = row.get("dob");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(Patient {
        id: row.get("id"),
        user_id: Uuid::parse_str(&user_id_str)
            .map_err(|e| AppError::internal(format!("Invalid user id '{user_id_str}': {e}")))?,
        name: row.get("name"),
        gender: Gender::from_code(gender_code)
            .ok_or_else(|| AppError::internal(format!("Invalid stored gender {gender_code}")))?,
        dob: NaiveDate::parse_from_str(&dob_str, "%Y-%m-%d")
            .map_err(|e| AppError::internal(format!("Invalid stored dob '{dob_str}': {e}")))?,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

fn row_to_patient_summary(row: &SqliteRow) -> AppResult<PatientSummary> {
    let prediction_id: Option<i64> = row.get("prediction_id");

    let latest_prediction = match prediction_id {
        Some(prediction_id) => {
            let created_at_str: String = row.get("prediction_created_at");
            Some(PredictionSummary {
                prediction_id,
                probability: row.get("probability"),
                risk_label: row.get("risk_label"),
                created_at: parse_timestamp(&created_at_str)?,
            })
        }
        None => None,
    };

    Ok(PatientSummary {
        patient: row_to_patient(row)?,
        latest_prediction,
    })
}
