// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Issues HS256 bearer tokens and resolves the caller from request headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! Passwords are hashed with bcrypt on the blocking thread pool. Sessions are
//! stateless HS256 JWTs carrying the user id, email, issue and expiry times.

use crate::config::AuthConfig;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, warn};
use uuid::Uuid;

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
    /// Email from the token
    pub email: String,
}

/// Authentication manager for `JWT` tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_expiry_hours: config.jwt_expiry_hours,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Token lifetime in hours
    #[must_use]
    pub const fn token_expiry_hours(&self) -> i64 {
        self.token_expiry_hours
    }

    /// Hash a password on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password hashing error: {e}")))
    }

    /// Check a password against a stored hash on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an internal error if the hash cannot be checked
    pub async fn verify_password(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Password verification error: {e}")))
    }

    /// Generate a `JWT` for a user
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))
    }

    /// Validate a token's signature and expiry
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for an expired token and `AuthInvalid` for any
    /// other validation failure
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::auth_expired(),
                _ => {
                    warn!(error = %e, "JWT validation failed");
                    AppError::auth_invalid(format!("Invalid token: {e}"))
                }
            })
    }

    /// Resolve the caller from an `Authorization: Bearer` header
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when no bearer token is present, otherwise the
    /// errors of [`Self::validate_token`]
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::auth_invalid("Authorization header must be a Bearer token"))?;

        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))?;

        debug!(user_id = %user_id, "Request authenticated");
        Ok(AuthResult {
            user_id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use axum::http::HeaderValue;

    fn manager(secret: &str) -> AuthManager {
        AuthManager::new(&AuthConfig {
            jwt_secret: secret.to_owned(),
            jwt_expiry_hours: 1,
            bcrypt_cost: 4,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "doctor@example.com".to_owned(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_token_round_trip() {
        let auth = manager("secret");
        let user = user();
        let token = auth.generate_token(&user).unwrap();

        let result = auth.authenticate(&bearer(&token)).unwrap();
        assert_eq!(result.user_id, user.id);
        assert_eq!(result.email, user.email);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = manager("one").generate_token(&user()).unwrap();
        let err = manager("two").validate_token(&token).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = manager("secret");
        let issued = Utc::now() - Duration::hours(3);
        let token = auth
            .encode_claims(&Claims {
                sub: Uuid::new_v4().to_string(),
                email: "old@example.com".to_owned(),
                iat: issued.timestamp(),
                exp: (issued + Duration::hours(1)).timestamp(),
            })
            .unwrap();

        assert_eq!(
            auth.validate_token(&token).unwrap_err().code,
            ErrorCode::AuthExpired
        );
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let auth = manager("secret");
        assert_eq!(
            auth.authenticate(&HeaderMap::new()).unwrap_err().code,
            ErrorCode::AuthRequired
        );

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(
            auth.authenticate(&headers).unwrap_err().code,
            ErrorCode::AuthInvalid
        );
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let auth = manager("secret");
        let hash = auth.hash_password("hunter22").await.unwrap();
        assert!(auth.verify_password("hunter22", &hash).await.unwrap());
        assert!(!auth.verify_password("wrong", &hash).await.unwrap());
    }
}
