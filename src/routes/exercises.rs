// ABOUTME: Exercise template catalog listing and administration routes
// ABOUTME: Changes here never rewrite stored plans; plans resolve against the catalog at read time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use super::authenticate;
use crate::database::TemplateInput;
use crate::errors::AppError;
use crate::resources::ServerResources;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use heartcare_intelligence::ExerciseTemplate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Template listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateListResponse {
    /// Templates in catalog order
    pub templates: Vec<ExerciseTemplate>,
}

/// Exercise template routes implementation
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    /// Create all exercise template routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/exercise-templates",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/exercise-templates/:id",
                put(Self::handle_update).delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/exercise-templates
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources)?;
        let templates = resources.database.exercise_templates().list_templates().await?;
        Ok((StatusCode::OK, Json(TemplateListResponse { templates })).into_response())
    }

    /// Handle POST /api/exercise-templates
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(input): Json<TemplateInput>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let template = resources
            .database
            .exercise_templates()
            .create_template(&input)
            .await?;

        info!(template_id = template.id, user_id = %auth.user_id, "Exercise template created");
        Ok((StatusCode::CREATED, Json(template)).into_response())
    }

    /// Handle PUT /api/exercise-templates/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
        Json(input): Json<TemplateInput>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        let template = resources
            .database
            .exercise_templates()
            .update_template(id, &input)
            .await?;

        info!(template_id = id, user_id = %auth.user_id, "Exercise template updated");
        Ok((StatusCode::OK, Json(template)).into_response())
    }

    /// Handle DELETE /api/exercise-templates/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<i64>,
    ) -> Result<Response, AppError> {
        let auth = authenticate(&headers, &resources)?;
        if !resources
            .database
            .exercise_templates()
            .delete_template(id)
            .await?
        {
            return Err(AppError::not_found(format!("Exercise template {id}")));
        }

        info!(template_id = id, user_id = %auth.user_id, "Exercise template deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
