// ABOUTME: Prediction ingestion, prediction history and recommendation listing routes
// ABOUTME: Stored plans are rehydrated against one catalog snapshot per request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Prediction and recommendation routes

use std::sync::Arc;

use super::{authenticate, owned_patient, PageQuery};
use crate::catalog::TemplateCatalog;
use crate::errors::AppError;
use crate::external::FeaturePayload;
use crate::models::{Prediction, StoredRecommendation};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use heartcare_intelligence::{index_by_id, rehydrate_indexed, DisplayPlan, TemplateIndex};
use serde::{Deserialize, Serialize};

/// Response for a successful ingestion
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePredictionResponse {
    /// The stored prediction
    pub prediction: Prediction,
    /// Plan computed for it
    pub recommendation: DisplayPlan,
}

/// Prediction history response
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionListResponse {
    /// Predictions, newest first
    pub predictions: Vec<Prediction>,
}

/// One stored recommendation, resolved against the current catalog
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    /// Row identifier
    pub id: i64,
    /// Patient identifier
    pub patient_id: i64,
    /// Prediction the plan was built from
    pub prediction_id: i64,
    /// Resolved plan; absent when the stored plan is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<DisplayPlan>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RecommendationResponse {
    fn resolve(stored: StoredRecommendation, index: &TemplateIndex<'_>) -> Self {
        Self {
            plan: rehydrate_indexed(&stored.plan, index),
            id: stored.id,
            patient_id: stored.patient_id,
            prediction_id: stored.prediction_id,
            created_at: stored.created_at,
        }
    }
}

/// Recommendation listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationListResponse {
    /// Recommendations, newest first
    pub recommendations: Vec<RecommendationResponse>,
}

/// Prediction routes implementation
pub struct PredictionRoutes;

impl PredictionRoutes {
    /// Create all prediction routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/patients/:id/predict", post(Self::handle_predict))
            .route("/api/patients/:id/predictions", get(Self::handle_list))
            .route(
                "/api/patients/:id/recommendations",
                get(Self::handle_recommendations),
            )
            .with_state(resources)
    }

    /// Handle POST /api/patients/:id/predict
    async fn handle_predict(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(payload): Json<FeaturePayload>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let patient = owned_patient(&resources, &auth, id).await?;
        payload.validate()?;

        let outcome = resources.ingestion.ingest(patient.id, &payload).await?;

        Ok((
            StatusCode::CREATED,
            Json(CreatePredictionResponse {
                prediction: outcome.prediction,
                recommendation: outcome.plan,
            }),
        )
            .into_response())
    }

    /// Handle GET /api/patients/:id/predictions
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Query(page): Query<PageQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        owned_patient(&resources, &auth, id).await?;

        let predictions = resources
            .database
            .predictions()
            .list_by_patient(id, page.limit, page.offset)
            .await?;

        Ok((StatusCode::OK, Json(PredictionListResponse { predictions })).into_response())
    }

    /// Handle GET /api/patients/:id/recommendations
    async fn handle_recommendations(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Query(page): Query<PageQuery>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        owned_patient(&resources, &auth, id).await?;

        let stored = resources
            .database
            .recommendations()
            .list_by_patient(id, page.limit, page.offset)
            .await?;

        let templates =
            TemplateCatalog::list_templates(&resources.database.exercise_templates()).await?;
        let index = index_by_id(&templates);

        let recommendations = stored
            .into_iter()
            .map(|row| RecommendationResponse::resolve(row, &index))
            .collect();

        Ok((
            StatusCode::OK,
            Json(RecommendationListResponse { recommendations }),
        )
            .into_response())
    }
}
