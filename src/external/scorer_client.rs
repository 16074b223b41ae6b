// ABOUTME: HTTP client for the external cardiovascular risk scoring service
// ABOUTME: Maps client feature payloads to the scorer wire format and fails fast on any scorer error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Risk scorer client
//!
//! The scorer is a single `POST {base}/predict` call with a JSON body. Every
//! failure mode (unreachable host, timeout, non-success status, undecodable
//! body) is reported as `ScoringUnavailable`. There is exactly one attempt per
//! call; retries are the caller's decision.

use crate::config::ScorerConfig;
use crate::constants::{endpoints, service_names};
use crate::errors::{AppError, AppResult};
use crate::models::RiskFactor;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ============================================================================
// Wire Types
// ============================================================================

/// Feature vector in the scorer's wire format
///
/// Serialized verbatim into `predictions.raw_features`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerFeatures {
    /// Age in years
    pub age_years: f64,
    /// Gender code, 1 or 2
    pub gender: i32,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Systolic blood pressure
    pub ap_hi: i32,
    /// Diastolic blood pressure
    pub ap_lo: i32,
    /// Cholesterol band, 1 (normal) to 3 (well above normal)
    pub cholesterol: i32,
    /// Glucose band, 1 (normal) to 3 (well above normal)
    pub gluc: i32,
    /// Smoker flag, 0 or 1
    pub smoke: i32,
    /// Alcohol intake flag, 0 or 1
    pub alco: i32,
    /// Physical activity flag, 0 or 1
    pub active: i32,
}

/// Scorer response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    /// Probability of cardiovascular disease in `[0, 1]`
    pub probability: f64,
    /// Binary class label, when the scorer reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<i64>,
    /// Categorical risk label, passed through unvalidated
    #[serde(alias = "risk_label")]
    pub risk_level: String,
    /// Optional per-feature annotations
    #[serde(default)]
    pub factors: Vec<RiskFactor>,
}

// ============================================================================
// Client Request Payload
// ============================================================================

/// Prediction request body as submitted by API clients
///
/// Accepts both the scorer's short field names and descriptive names. The
/// three lifestyle flags carry explicit presence: an absent flag is sent to
/// the scorer as 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeaturePayload {
    /// Age in years
    pub age_years: f64,
    /// Gender code, 1 or 2
    pub gender: i32,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Systolic blood pressure
    #[serde(alias = "systolic")]
    pub ap_hi: i32,
    /// Diastolic blood pressure
    #[serde(alias = "diastolic")]
    pub ap_lo: i32,
    /// Cholesterol band
    pub cholesterol: i32,
    /// Glucose band
    #[serde(alias = "glucose")]
    pub gluc: i32,
    /// Smoker flag
    #[serde(default, alias = "smoker", skip_serializing_if = "Option::is_none")]
    pub smoke: Option<i32>,
    /// Alcohol intake flag
    #[serde(
        default,
        alias = "drinks_alcohol",
        skip_serializing_if = "Option::is_none"
    )]
    pub alco: Option<i32>,
    /// Physical activity flag
    #[serde(
        default,
        alias = "physically_active",
        skip_serializing_if = "Option::is_none"
    )]
    pub active: Option<i32>,
}

impl FeaturePayload {
    /// Reject malformed client input before anything reaches the scorer
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field
    pub fn validate(&self) -> AppResult<()> {
        if !(self.age_years.is_finite() && self.age_years > 0.0) {
            return Err(AppError::out_of_range("age_years must be positive"));
        }
        if !matches!(self.gender, 1 | 2) {
            return Err(AppError::out_of_range("gender must be 1 or 2"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(AppError::out_of_range("height must be positive"));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            return Err(AppError::out_of_range("weight must be positive"));
        }
        if self.ap_hi <= 0 || self.ap_lo <= 0 {
            return Err(AppError::out_of_range(
                "blood pressure values must be positive",
            ));
        }
        if !(1..=3).contains(&self.cholesterol) {
            return Err(AppError::out_of_range("cholesterol must be between 1 and 3"));
        }
        if !(1..=3).contains(&self.gluc) {
            return Err(AppError::out_of_range("gluc must be between 1 and 3"));
        }

        for (name, flag) in [
            ("smoke", self.smoke),
            ("alco", self.alco),
            ("active", self.active),
        ] {
            if let Some(value) = flag {
                if !matches!(value, 0 | 1) {
                    return Err(AppError::out_of_range(format!("{name} must be 0 or 1")));
                }
            }
        }

        Ok(())
    }

    /// Translate into the scorer request shape
    #[must_use]
    pub fn to_scorer_features(&self) -> ScorerFeatures {
        ScorerFeatures {
            age_years: self.age_years,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            ap_hi: self.ap_hi,
            ap_lo: self.ap_lo,
            cholesterol: self.cholesterol,
            gluc: self.gluc,
            smoke: self.smoke.unwrap_or(0),
            alco: self.alco.unwrap_or(0),
            active: self.active.unwrap_or(0),
        }
    }
}

// ============================================================================
// Scorer Trait
// ============================================================================

/// External risk scoring service
#[async_trait]
pub trait RiskScorer: Send + Sync {
    /// Score one feature vector
    ///
    /// # Errors
    ///
    /// Returns `ScoringUnavailable` if the scorer cannot produce a result
    async fn score(&self, features: &ScorerFeatures) -> AppResult<ScoringResult>;
}

// ============================================================================
// HTTP Client
// ============================================================================

/// `reqwest`-backed scorer client
#[derive(Debug, Clone)]
pub struct HttpScorerClient {
    config: ScorerConfig,
    http_client: Client,
    predict_url: String,
}

impl HttpScorerClient {
    /// Create a client with the configured request and connect timeouts
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built
    pub fn new(config: ScorerConfig) -> AppResult<Self> {
        let http_client = ClientBuilder::new()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| AppError::config(format!("Failed to build scorer HTTP client: {e}")))?;

        let predict_url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            endpoints::SCORER_PREDICT
        );

        Ok(Self {
            config,
            http_client,
            predict_url,
        })
    }

    /// Base URL this client talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Perform the single scorer round trip
    async fn request_score(&self, features: &ScorerFeatures) -> AppResult<ScoringResult> {
        debug!(url = %self.predict_url, "Calling risk scorer");

        let response = self
            .http_client
            .post(&self.predict_url)
            .json(features)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("scorer request timed out: {e}")
                } else {
                    format!("scorer request failed: {e}")
                };
                AppError::scoring_unavailable(reason).with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Risk scorer returned an error status");
            return Err(AppError::scoring_unavailable(format!(
                "{} returned status {status}",
                service_names::SCORER
            )));
        }

        let result: ScoringResult = response.json().await.map_err(|e| {
            AppError::scoring_unavailable(format!("Failed to parse scorer response: {e}"))
        })?;

        if !(0.0..=1.0).contains(&result.probability) {
            return Err(AppError::scoring_unavailable(format!(
                "scorer returned probability {} outside [0, 1]",
                result.probability
            )));
        }

        Ok(result)
    }
}

#[async_trait]
impl RiskScorer for HttpScorerClient {
    async fn score(&self, features: &ScorerFeatures) -> AppResult<ScoringResult> {
        let result = self.request_score(features).await;

        match &result {
            Ok(scored) => info!(
                probability = scored.probability,
                risk_level = %scored.risk_level,
                factors = scored.factors.len(),
                "Risk scorer responded"
            ),
            Err(e) => warn!(error = %e, "Risk scorer unavailable"),
        }

        result
    }
}
