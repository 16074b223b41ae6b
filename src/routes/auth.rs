// ABOUTME: User registration, login and current-user route handlers
// ABOUTME: Passwords are bcrypt hashed; sessions are HS256 bearer tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authentication routes

use std::sync::Arc;

use crate::constants::limits;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::logging::AppLogger;
use crate::models::User;
use crate::resources::ServerResources;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Registration and login payload
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    /// Email address
    pub email: String,
    /// Plain-text password
    pub password: String,
}

impl CredentialsRequest {
    fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    fn validate_for_registration(&self) -> AppResult<()> {
        let email = self.normalized_email();
        if email.is_empty() {
            return Err(AppError::new(
                ErrorCode::MissingRequiredField,
                "email is required",
            ));
        }
        if !email.contains('@') {
            return Err(AppError::new(
                ErrorCode::InvalidFormat,
                "email must be a valid address",
            ));
        }
        if self.password.chars().count() < limits::MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "password must be at least {} characters",
                limits::MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

/// Registration response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// The new user
    pub user: User,
    /// Bearer token for the new user
    pub token: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub access_token: String,
    /// The authenticated user
    pub user: User,
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/users/me", get(Self::handle_me))
            .with_state(resources)
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CredentialsRequest>,
    ) -> Result<Response, AppError> {
        request.validate_for_registration()?;
        let email = request.normalized_email();

        let password_hash = resources
            .auth_manager
            .hash_password(&request.password)
            .await?;
        let user = match resources
            .database
            .users()
            .create_user(&email, &password_hash)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                AppLogger::log_auth_event(&email, "register", false);
                return Err(e);
            }
        };
        let token = resources.auth_manager.generate_token(&user)?;

        AppLogger::log_auth_event(&email, "register", true);
        info!(user_id = %user.id, "User registered");

        Ok((StatusCode::CREATED, Json(RegisterResponse { user, token })).into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<CredentialsRequest>,
    ) -> Result<Response, AppError> {
        let email = request.normalized_email();

        let Some(user) = resources.database.users().get_user_by_email(&email).await? else {
            AppLogger::log_auth_event(&email, "login", false);
            return Err(AppError::auth_invalid("Invalid email or password"));
        };

        let valid = resources
            .auth_manager
            .verify_password(&request.password, &user.password_hash)
            .await?;
        if !valid {
            AppLogger::log_auth_event(&email, "login", false);
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let access_token = resources.auth_manager.generate_token(&user)?;
        AppLogger::log_auth_event(&email, "login", true);

        Ok((StatusCode::OK, Json(LoginResponse { access_token, user })).into_response())
    }

    /// Handle GET /api/users/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = super::authenticate(&headers, &resources)?;

        let user = resources
            .database
            .users()
            .get_user(auth.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok((StatusCode::OK, Json(user)).into_response())
    }
}
