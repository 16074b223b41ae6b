// ABOUTME: Core data models for users, patients, predictions and stored recommendations
// ABOUTME: Shared by the SQLite managers, the ingestion pipeline and the HTTP routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! - `User`: an account that owns patients
//! - `Patient`: a person whose cardiovascular risk is tracked
//! - `Prediction`: one immutable scoring event for a patient
//! - `StoredRecommendation`: a durable plan row keyed to a prediction

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use heartcare_intelligence::DurablePlan;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Login email address
    pub email: String,
    /// bcrypt hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Patients
// ============================================================================

/// Patient gender, stored as its numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Gender {
    /// Code 1
    Male,
    /// Code 2
    Female,
    /// Code 3
    Other,
}

impl Gender {
    /// Numeric code used in storage and on the wire
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Male => 1,
            Self::Female => 2,
            Self::Other => 3,
        }
    }

    /// Parse a numeric code
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            3 => Some(Self::Other),
            _ => None,
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl TryFrom<i64> for Gender {
    type Error = String;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("invalid gender code {code}"))
    }
}

impl From<Gender> for i64 {
    fn from(gender: Gender) -> Self {
        gender.code()
    }
}

/// Patient owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    /// Patient identifier
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Full name
    pub name: String,
    /// Gender
    pub gender: Gender,
    /// Date of birth
    pub dob: NaiveDate,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Age in whole years on the given date
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.year() - self.dob.year();
        if (today.month(), today.day()) < (self.dob.month(), self.dob.day()) {
            age -= 1;
        }
        age.max(0)
    }
}

/// Fields for creating a patient
#[derive(Debug, Clone)]
pub struct NewPatient {
    /// Full name
    pub name: String,
    /// Gender
    pub gender: Gender,
    /// Date of birth
    pub dob: NaiveDate,
}

/// Partial patient update; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    /// New name
    pub name: Option<String>,
    /// New gender
    pub gender: Option<Gender>,
    /// New date of birth
    pub dob: Option<NaiveDate>,
}

/// Latest scoring outcome shown in patient listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSummary {
    /// Prediction identifier
    pub prediction_id: i64,
    /// Probability in `[0, 1]`
    pub probability: f64,
    /// Risk label returned by the scorer
    pub risk_label: String,
    /// When it was scored
    pub created_at: DateTime<Utc>,
}

/// Patient plus their most recent prediction, if any
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    /// The patient
    #[serde(flatten)]
    pub patient: Patient,
    /// Most recent prediction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_prediction: Option<PredictionSummary>,
}

// ============================================================================
// Predictions
// ============================================================================

/// Risk factor annotation returned by the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    /// Feature name the factor refers to
    #[serde(default)]
    pub field: String,
    /// Short status such as "high" or "normal"
    #[serde(default)]
    pub status: String,
    /// Human-readable explanation
    #[serde(default)]
    pub message: String,
    /// Contribution to the score, when the scorer reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<f64>,
}

/// Prediction to be persisted
#[derive(Debug, Clone)]
pub struct NewPrediction {
    /// Patient the prediction belongs to
    pub patient_id: i64,
    /// Probability in `[0, 1]`
    pub probability: f64,
    /// Risk label, stored verbatim
    pub risk_label: String,
    /// Scorer request features, preserved verbatim
    pub raw_features: Value,
    /// Factor annotations
    pub factors: Vec<RiskFactor>,
}

/// Immutable stored prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Prediction identifier
    pub id: i64,
    /// Patient the prediction belongs to
    pub patient_id: i64,
    /// Probability in `[0, 1]`
    pub probability: f64,
    /// Risk label as returned by the scorer
    pub risk_label: String,
    /// Scorer request features
    pub raw_features: Value,
    /// Factor annotations
    pub factors: Vec<RiskFactor>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    /// Numeric feature from the raw payload, if present
    #[must_use]
    pub fn feature_f64(&self, key: &str) -> Option<f64> {
        self.raw_features.get(key).and_then(Value::as_f64)
    }
}

// ============================================================================
// Recommendations
// ============================================================================

/// Durable plan row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecommendation {
    /// Row identifier
    pub id: i64,
    /// Patient the plan belongs to
    pub patient_id: i64,
    /// Prediction the plan was built from
    pub prediction_id: i64,
    /// Durable plan; empty when the stored blob could not be parsed
    pub plan: DurablePlan,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Statistics
// ============================================================================

/// Number of patients whose latest prediction carries a risk label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskCount {
    /// Risk label
    pub risk_label: String,
    /// Patient count
    pub count: i64,
}

/// Aggregate statistics for a user's patients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientStats {
    /// Patients owned by the user
    pub total_patients: i64,
    /// Predictions across those patients
    pub total_predictions: i64,
    /// Latest-prediction risk label distribution
    pub risk_counts: Vec<RiskCount>,
}
