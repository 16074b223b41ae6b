// ABOUTME: Dashboard statistics route for the authenticated user's patients
// ABOUTME: Runs the three aggregate queries concurrently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use super::authenticate;
use crate::errors::AppError;
use crate::models::PatientStats;
use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

/// Statistics routes implementation
pub struct StatsRoutes;

impl StatsRoutes {
    /// Create all statistics routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/stats", get(Self::handle_stats))
            .with_state(resources)
    }

    /// Handle GET /api/stats
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let stats = resources.database.stats();

        let (total_patients, total_predictions, risk_counts) = tokio::try_join!(
            stats.total_patients(auth.user_id),
            stats.total_predictions(auth.user_id),
            stats.risk_distribution(auth.user_id),
        )?;

        Ok((
            StatusCode::OK,
            Json(PatientStats {
                total_patients,
                total_predictions,
                risk_counts,
            }),
        )
            .into_response())
    }
}
