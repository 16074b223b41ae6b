// ABOUTME: Route module organization for HeartCare server HTTP endpoints
// ABOUTME: Shared authentication, ownership and pagination helpers for the domain route modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the HeartCare server
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the database managers and service layer.

/// Registration, login and current-user routes
pub mod auth;
/// Exercise template administration routes
pub mod exercises;
/// Health check and readiness routes
pub mod health;
/// Patient CRUD routes
pub mod patients;
/// Prediction ingestion and recommendation routes
pub mod predictions;
/// Patient report routes
pub mod reports;
/// Dashboard statistics routes
pub mod stats;

pub use auth::AuthRoutes;
pub use exercises::ExerciseRoutes;
pub use health::HealthRoutes;
pub use patients::PatientRoutes;
pub use predictions::PredictionRoutes;
pub use reports::ReportRoutes;
pub use stats::StatsRoutes;

use std::sync::Arc;

use crate::auth::AuthResult;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::models::Patient;
use crate::resources::ServerResources;
use axum::http::HeaderMap;
use serde::Deserialize;

/// `limit` / `offset` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    /// Page size; defaults to 10, capped at 100
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
}

/// Resolve the caller from the bearer token
pub(crate) fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<AuthResult> {
    resources.auth_manager.authenticate(headers)
}

/// Load a patient and check that the caller owns it
///
/// Unknown patients are `ResourceNotFound`; another user's patient is
/// `PermissionDenied`.
pub(crate) async fn owned_patient(
    resources: &Arc<ServerResources>,
    auth: &AuthResult,
    patient_id: i64,
) -> AppResult<Patient> {
    let patient = resources
        .database
        .patients()
        .get_patient(patient_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Patient {patient_id}")))?;

    if patient.user_id != auth.user_id {
        AppLogger::log_security_event(
            "patient_access_denied",
            &format!("patient {patient_id} belongs to another user"),
            &auth.user_id.to_string(),
        );
        return Err(AppError::permission_denied(
            "Patient does not belong to the current user",
        ));
    }

    Ok(patient)
}
