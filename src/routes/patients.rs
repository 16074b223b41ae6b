// ABOUTME: Patient CRUD route handlers scoped to the authenticated user
// ABOUTME: Listing supports filtering on the latest prediction's risk label
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Patient routes
//!
//! Every patient-scoped handler goes through the ownership check: an unknown
//! patient is 404 and another user's patient is 403.

use std::sync::Arc;

use super::{authenticate, owned_patient};
use crate::database::RiskFilter;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Gender, NewPatient, PatientSummary, PatientUpdate};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use heartcare_intelligence::RiskLevel;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Create payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    /// Full name
    pub name: String,
    /// Gender code: 1, 2 or 3
    pub gender: i64,
    /// Date of birth, `YYYY-MM-DD`
    pub dob: String,
}

/// Partial update payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePatientRequest {
    /// New name
    pub name: Option<String>,
    /// New gender code
    pub gender: Option<i64>,
    /// New date of birth, `YYYY-MM-DD`
    pub dob: Option<String>,
}

/// Listing query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPatientsQuery {
    /// Page size
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: Option<u32>,
    /// Risk filter: low, medium, high, none, or empty for all
    #[serde(default)]
    pub risk: String,
}

/// Listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct PatientListResponse {
    /// Patients with their latest prediction
    pub patients: Vec<PatientSummary>,
}

fn parse_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::new(
            ErrorCode::MissingRequiredField,
            "name is required",
        ));
    }
    Ok(name.to_owned())
}

fn parse_gender(code: i64) -> AppResult<Gender> {
    Gender::from_code(code).ok_or_else(|| AppError::out_of_range("gender must be 1, 2 or 3"))
}

fn parse_dob(dob: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(dob.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::new(ErrorCode::InvalidFormat, "dob must be YYYY-MM-DD"))
}

/// Map the `risk` query parameter onto a listing filter
pub(crate) fn parse_risk_filter(risk: &str) -> AppResult<Option<RiskFilter>> {
    let risk = risk.trim();
    if risk.is_empty() {
        return Ok(None);
    }
    match RiskLevel::from_label(risk) {
        Some(RiskLevel::None) => Ok(Some(RiskFilter::Unscored)),
        Some(level) => Ok(Some(RiskFilter::Label(level.as_str().to_owned()))),
        None => Err(AppError::invalid_input(
            "risk must be one of low, medium, high, none",
        )),
    }
}

impl CreatePatientRequest {
    fn to_new_patient(&self) -> AppResult<NewPatient> {
        Ok(NewPatient {
            name: parse_name(&self.name)?,
            gender: parse_gender(self.gender)?,
            dob: parse_dob(&self.dob)?,
        })
    }
}

impl UpdatePatientRequest {
    fn to_update(&self) -> AppResult<PatientUpdate> {
        Ok(PatientUpdate {
            name: self.name.as_deref().map(parse_name).transpose()?,
            gender: self.gender.map(parse_gender).transpose()?,
            dob: self.dob.as_deref().map(parse_dob).transpose()?,
        })
    }
}

/// Patient routes implementation
pub struct PatientRoutes;

impl PatientRoutes {
    /// Create all patient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/patients",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/patients/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle POST /api/patients
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreatePatientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let new_patient = body.to_new_patient()?;

        let patient = resources
            .database
            .patients()
            .create_patient(auth.user_id, &new_patient)
            .await?;

        info!(patient_id = patient.id, user_id = %auth.user_id, "Patient created");
        Ok((StatusCode::CREATED, Json(patient)).into_response())
    }

    /// Handle GET /api/patients
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListPatientsQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let filter = parse_risk_filter(&query.risk)?;

        let patients = resources
            .database
            .patients()
            .list_patients(auth.user_id, filter.as_ref(), query.limit, query.offset)
            .await?;

        Ok((StatusCode::OK, Json(PatientListResponse { patients })).into_response())
    }

    /// Handle GET /api/patients/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let patient = owned_patient(&resources, &auth, id).await?;
        Ok((StatusCode::OK, Json(patient)).into_response())
    }

    /// Handle PUT /api/patients/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(body): Json<UpdatePatientRequest>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        owned_patient(&resources, &auth, id).await?;
        let update = body.to_update()?;

        let patient = resources
            .database
            .patients()
            .update_patient(id, &update)
            .await?;

        Ok((StatusCode::OK, Json(patient)).into_response())
    }

    /// Handle DELETE /api/patients/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        owned_patient(&resources, &auth, id).await?;

        if !resources.database.patients().delete_patient(id).await? {
            return Err(AppError::not_found(format!("Patient {id}")));
        }

        info!(patient_id = id, user_id = %auth.user_id, "Patient deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
