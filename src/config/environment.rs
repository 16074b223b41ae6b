// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use crate::constants::{defaults, env_config};
use crate::errors::{AppError, AppResult};
use heartcare_intelligence::SummaryPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if this is a development environment
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file path
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string; anything not prefixed with `sqlite:` is treated as a file path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        let path_str = path_str.strip_prefix("//").unwrap_or(path_str);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::parse_url(defaults::DATABASE_URL)
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Scoring service configuration
    pub scorer: ScorerConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Recommendation summary policy
    pub recommendation: RecommendationConfig,
    /// CORS configuration
    pub cors: CorsConfig,
    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Clinic name printed on reports
    pub clinic_name: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: DatabaseUrl,
    /// Maximum pool size
    pub max_connections: u32,
}

/// External scoring service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Base URL, without the `/predict` path
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl ScorerConfig {
    /// Request timeout as a duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout as a duration
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Authentication configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Recommendation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// How plan summaries are produced
    pub summary_policy: SummaryPolicy,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: defaults::HTTP_PORT,
            host: defaults::HOST.to_owned(),
            environment: Environment::default(),
            database: DatabaseConfig {
                url: DatabaseUrl::default(),
                max_connections: defaults::DATABASE_MAX_CONNECTIONS,
            },
            scorer: ScorerConfig {
                base_url: defaults::SCORER_BASE_URL.to_owned(),
                timeout_secs: defaults::SCORER_TIMEOUT_SECS,
                connect_timeout_secs: defaults::SCORER_CONNECT_TIMEOUT_SECS,
            },
            auth: AuthConfig {
                jwt_secret: defaults::JWT_SECRET.to_owned(),
                jwt_expiry_hours: defaults::JWT_EXPIRY_HOURS,
                bcrypt_cost: defaults::BCRYPT_COST,
            },
            recommendation: RecommendationConfig::default(),
            cors: CorsConfig {
                allowed_origins: parse_origins(defaults::CORS_ALLOWED_ORIGINS),
            },
            request_timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            clinic_name: defaults::CLINIC_NAME.to_owned(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a numeric value does not parse or a
    /// value fails validation
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: parse_env(env_config::HTTP_PORT, defaults::HTTP_PORT)?,
            host: env_var_or(env_config::HOST, defaults::HOST),
            environment: Environment::from_str_or_default(&env_var_or(
                env_config::ENVIRONMENT,
                "development",
            )),
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_var_or(
                    env_config::DATABASE_URL,
                    defaults::DATABASE_URL,
                )),
                max_connections: parse_env(
                    env_config::DATABASE_MAX_CONNECTIONS,
                    defaults::DATABASE_MAX_CONNECTIONS,
                )?,
            },
            scorer: ScorerConfig {
                base_url: env_var_or(env_config::SCORER_BASE_URL, defaults::SCORER_BASE_URL)
                    .trim_end_matches('/')
                    .to_owned(),
                timeout_secs: parse_env(
                    env_config::SCORER_TIMEOUT_SECS,
                    defaults::SCORER_TIMEOUT_SECS,
                )?,
                connect_timeout_secs: parse_env(
                    env_config::SCORER_CONNECT_TIMEOUT_SECS,
                    defaults::SCORER_CONNECT_TIMEOUT_SECS,
                )?,
            },
            auth: AuthConfig {
                jwt_secret: env_var_or(env_config::JWT_SECRET, defaults::JWT_SECRET),
                jwt_expiry_hours: parse_env(
                    env_config::JWT_EXPIRY_HOURS,
                    defaults::JWT_EXPIRY_HOURS,
                )?,
                bcrypt_cost: parse_env(env_config::BCRYPT_COST, defaults::BCRYPT_COST)?,
            },
            recommendation: RecommendationConfig {
                summary_policy: parse_summary_policy(
                    env::var(env_config::RECOMMENDATION_SUMMARY).ok().as_deref(),
                    env::var(env_config::RECOMMENDATION_SUMMARY_TEXT).ok().as_deref(),
                )?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or(
                    env_config::CORS_ALLOWED_ORIGINS,
                    defaults::CORS_ALLOWED_ORIGINS,
                )),
            },
            request_timeout_secs: parse_env(
                env_config::REQUEST_TIMEOUT_SECS,
                defaults::REQUEST_TIMEOUT_SECS,
            )?,
            clinic_name: env_var_or(env_config::CLINIC_NAME, defaults::CLINIC_NAME),
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first invalid value
    pub fn validate(&self) -> AppResult<()> {
        if !(self.scorer.base_url.starts_with("http://")
            || self.scorer.base_url.starts_with("https://"))
        {
            return Err(AppError::config(format!(
                "SCORER_BASE_URL must be an http(s) URL, got '{}'",
                self.scorer.base_url
            )));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(AppError::config(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }

        if self.auth.jwt_expiry_hours <= 0 {
            return Err(AppError::config("JWT_EXPIRY_HOURS must be positive"));
        }

        if self.database.max_connections == 0 {
            return Err(AppError::config("DATABASE_MAX_CONNECTIONS must be positive"));
        }

        if self.auth.jwt_secret == defaults::JWT_SECRET && !self.environment.is_development() {
            warn!(
                environment = %self.environment,
                "JWT_SECRET is using the development default outside development"
            );
        }

        Ok(())
    }

    /// Whole-request timeout as a duration
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "HeartCare Server Configuration:\n\
             - Bind: {}:{}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - Scorer: {} (timeout {}s)\n\
             - Recommendation summary: {:?}\n\
             - CORS origins: {}\n\
             - Request timeout: {}s",
            self.host,
            self.http_port,
            self.environment,
            if self.database.url.is_memory() {
                "SQLite (in-memory)"
            } else {
                "SQLite"
            },
            self.scorer.base_url,
            self.scorer.timeout_secs,
            self.recommendation.summary_policy,
            self.cors.allowed_origins.join(", "),
            self.request_timeout_secs,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

/// Resolve the summary policy; a fixed text wins over the mode
fn parse_summary_policy(mode: Option<&str>, text: Option<&str>) -> AppResult<SummaryPolicy> {
    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(SummaryPolicy::Fixed(text.to_owned()));
    }

    match mode.map(|m| m.trim().to_lowercase()).as_deref() {
        None | Some("" | "risk_guidance") => Ok(SummaryPolicy::RiskGuidance),
        Some("empty") => Ok(SummaryPolicy::Empty),
        Some(other) => Err(AppError::config(format!(
            "Invalid {} value '{other}': expected 'empty' or 'risk_guidance'",
            env_config::RECOMMENDATION_SUMMARY
        ))),
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
