// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, fixtures and fake collaborators for the ingestion pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `heartcare_server`
//!
//! This module provides common test setup functions to reduce duplication
//! across integration tests.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use heartcare_intelligence::{DurablePlan, ExerciseTemplate};
use heartcare_server::{
    catalog::TemplateCatalog,
    config::{DatabaseUrl, ServerConfig},
    database::{Database, TemplateInput},
    errors::{AppError, AppResult},
    external::{RiskScorer, ScorerFeatures, ScoringResult},
    models::{Gender, NewPatient, Patient, StoredRecommendation, User},
    resources::ServerResources,
    stores::RecommendationStore,
};
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Configuration for tests: in-memory database and a cheap bcrypt cost
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.database.url = DatabaseUrl::Memory;
    config.auth.jwt_secret = "test-secret-for-integration-tests".to_owned();
    config.auth.bcrypt_cost = 4;
    config.clinic_name = "Test Clinic".to_owned();
    config
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    let database = Database::new(&DatabaseUrl::Memory, 1).await?;
    Ok(database)
}

/// Server resources over a fresh in-memory database and the given scorer
pub async fn create_test_resources(scorer: Arc<dyn RiskScorer>) -> Result<Arc<ServerResources>> {
    let database = create_test_database().await?;
    Ok(Arc::new(ServerResources::new(test_config(), database, scorer)))
}

/// Create a user with a known password and return it with a bearer token
pub async fn create_test_user(resources: &ServerResources, email: &str) -> Result<(User, String)> {
    let password_hash = resources.auth_manager.hash_password("password123").await?;
    let user = resources
        .database
        .users()
        .create_user(email, &password_hash)
        .await?;
    let token = resources.auth_manager.generate_token(&user)?;
    Ok((user, token))
}

/// Insert a user directly; for tests that never log in
pub async fn create_plain_user(database: &Database, email: &str) -> Result<User> {
    let user = database
        .users()
        .create_user(email, "$2b$04$not-a-real-bcrypt-hash-for-tests")
        .await?;
    Ok(user)
}

/// Create a patient owned by `user`
pub async fn create_test_patient(database: &Database, user: &User, name: &str) -> Result<Patient> {
    let patient = database
        .patients()
        .create_patient(
            user.id,
            &NewPatient {
                name: name.to_owned(),
                gender: Gender::Female,
                dob: NaiveDate::from_ymd_opt(1970, 6, 15).unwrap(),
            },
        )
        .await?;
    Ok(patient)
}

/// Template input with the given name and target risk level
pub fn template_input(name: &str, target_risk_level: &str) -> TemplateInput {
    TemplateInput {
        name: name.to_owned(),
        intensity: "light".to_owned(),
        description: format!("{name} at a comfortable pace"),
        duration_min: 30,
        freq_per_week: 3,
        target_risk_level: target_risk_level.to_owned(),
        tags: vec!["cardio".to_owned()],
    }
}

/// Insert templates in order and return them
pub async fn seed_templates(
    database: &Database,
    specs: &[(&str, &str)],
) -> Result<Vec<ExerciseTemplate>> {
    let manager = database.exercise_templates();
    let mut created = Vec::with_capacity(specs.len());
    for (name, target) in specs {
        created.push(manager.create_template(&template_input(name, target)).await?);
    }
    Ok(created)
}

/// A complete feature payload as a client would send it
pub fn feature_payload_json() -> serde_json::Value {
    serde_json::json!({
        "age_years": 54.2,
        "gender": 2,
        "height": 165.0,
        "weight": 82.5,
        "ap_hi": 150,
        "ap_lo": 95,
        "cholesterol": 3,
        "gluc": 1,
        "smoke": 1,
        "alco": 0,
        "active": 0
    })
}

// ============================================================================
// Fake Collaborators
// ============================================================================

/// Scorer returning a fixed result, or failing, and counting calls
pub struct MockScorer {
    result: Option<ScoringResult>,
    calls: AtomicUsize,
}

impl MockScorer {
    /// Scorer that always returns `probability` and `risk_level`
    pub fn returning(probability: f64, risk_level: &str) -> Self {
        Self {
            result: Some(ScoringResult {
                probability,
                label: Some(i64::from(probability >= 0.5)),
                risk_level: risk_level.to_owned(),
                factors: Vec::new(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    /// Scorer that always fails as if unreachable
    pub fn failing() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of score calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RiskScorer for MockScorer {
    async fn score(&self, _features: &ScorerFeatures) -> AppResult<ScoringResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .ok_or_else(|| AppError::scoring_unavailable("mock scorer unreachable"))
    }
}

/// Catalog that can never be read
pub struct FailingCatalog;

#[async_trait]
impl TemplateCatalog for FailingCatalog {
    async fn list_templates(&self) -> AppResult<Vec<ExerciseTemplate>> {
        Err(AppError::catalog_unavailable("catalog offline"))
    }
}

/// Recommendation store whose writes always fail
pub struct FailingRecommendationStore;

#[async_trait]
impl RecommendationStore for FailingRecommendationStore {
    async fn create_recommendation(
        &self,
        _patient_id: i64,
        _prediction_id: i64,
        _plan: &DurablePlan,
    ) -> AppResult<StoredRecommendation> {
        Err(AppError::database("recommendation table unavailable"))
    }
}
