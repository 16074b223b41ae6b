// ABOUTME: Patient report routes returning the report view model as JSON or HTML
// ABOUTME: The HTML document is what an external PDF renderer would consume
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use super::{authenticate, owned_patient};
use crate::errors::AppError;
use crate::resources::ServerResources;
use crate::services::render_html;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;

/// Report routes implementation
pub struct ReportRoutes;

impl ReportRoutes {
    /// Create all report routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/patients/:id/report", get(Self::handle_report))
            .route("/api/patients/:id/report.html", get(Self::handle_report_html))
            .with_state(resources)
    }

    /// Handle GET /api/patients/:id/report
    async fn handle_report(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let patient = owned_patient(&resources, &auth, id).await?;

        let report = resources
            .report_builder()
            .build(&patient, Utc::now())
            .await?;

        Ok((StatusCode::OK, Json(report)).into_response())
    }

    /// Handle GET /api/patients/:id/report.html
    async fn handle_report_html(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let patient = owned_patient(&resources, &auth, id).await?;

        let report = resources
            .report_builder()
            .build(&patient, Utc::now())
            .await?;

        Ok((StatusCode::OK, Html(render_html(&report))).into_response())
    }
}
