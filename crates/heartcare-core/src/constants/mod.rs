// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for limits, service names, defaults and env variable names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! flat namespace.

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// Readiness endpoint
    pub const READY_CHECK: &str = "/ready";
    /// API base path
    pub const API_BASE: &str = "/api";
    /// Scorer prediction endpoint, relative to the scorer base URL
    pub const SCORER_PREDICT: &str = "/predict";
}

/// Service names used in logs and error messages
pub mod service_names {
    /// This server
    pub const HEARTCARE_SERVER: &str = "heartcare-server";
    /// External risk scoring service
    pub const SCORER: &str = "scorer";
}

/// Request and domain limits
pub mod limits {
    /// Default page size for list endpoints
    pub const DEFAULT_PAGE_LIMIT: u32 = 10;
    /// Largest page size accepted by list endpoints
    pub const MAX_PAGE_LIMIT: u32 = 100;
    /// Number of predictions shown in a patient report history
    pub const REPORT_HISTORY_LIMIT: u32 = 50;
    /// Minimum password length at registration
    pub const MIN_PASSWORD_LENGTH: usize = 6;
}

/// Default configuration values
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8080;
    /// Default bind host
    pub const HOST: &str = "127.0.0.1";
    /// Default database URL
    pub const DATABASE_URL: &str = "sqlite:./data/heartcare.db";
    /// Default pool size
    pub const DATABASE_MAX_CONNECTIONS: u32 = 5;
    /// Default scorer base URL
    pub const SCORER_BASE_URL: &str = "http://localhost:8000";
    /// Default scorer request timeout
    pub const SCORER_TIMEOUT_SECS: u64 = 10;
    /// Default scorer connect timeout
    pub const SCORER_CONNECT_TIMEOUT_SECS: u64 = 5;
    /// Development-only JWT secret
    pub const JWT_SECRET: &str = "dev-secret";
    /// Default token lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 24;
    /// Default bcrypt cost
    pub const BCRYPT_COST: u32 = 12;
    /// Default whole-request timeout
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    /// Default allowed CORS origin (local frontend)
    pub const CORS_ALLOWED_ORIGINS: &str = "http://localhost:5173";
    /// Clinic name printed on reports
    pub const CLINIC_NAME: &str = "HeartCare Clinic";
}

/// Environment variable names
pub mod env_config {
    /// Listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Bind host
    pub const HOST: &str = "HOST";
    /// Database URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Pool size
    pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
    /// Scorer base URL
    pub const SCORER_BASE_URL: &str = "SCORER_BASE_URL";
    /// Scorer request timeout
    pub const SCORER_TIMEOUT_SECS: &str = "SCORER_TIMEOUT_SECS";
    /// Scorer connect timeout
    pub const SCORER_CONNECT_TIMEOUT_SECS: &str = "SCORER_CONNECT_TIMEOUT_SECS";
    /// JWT signing secret
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// Token lifetime
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// Password hashing cost
    pub const BCRYPT_COST: &str = "BCRYPT_COST";
    /// Recommendation summary mode
    pub const RECOMMENDATION_SUMMARY: &str = "RECOMMENDATION_SUMMARY";
    /// Fixed recommendation summary text
    pub const RECOMMENDATION_SUMMARY_TEXT: &str = "RECOMMENDATION_SUMMARY_TEXT";
    /// Allowed CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Whole-request timeout
    pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
    /// Clinic name printed on reports
    pub const CLINIC_NAME: &str = "CLINIC_NAME";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}
