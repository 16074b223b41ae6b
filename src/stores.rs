// ABOUTME: Persistence traits the prediction ingestion pipeline depends on
// ABOUTME: Implemented by the SQLite managers and by in-memory fakes in tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppResult;
use crate::models::{NewPrediction, Prediction, StoredRecommendation};
use async_trait::async_trait;
use heartcare_intelligence::DurablePlan;

/// Writes immutable prediction records
#[async_trait]
pub trait PredictionStore: Send + Sync {
    /// Persist a prediction and return the stored record
    async fn create_prediction(&self, prediction: &NewPrediction) -> AppResult<Prediction>;
}

/// Writes durable recommendation plans keyed to a prediction
#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Persist a durable plan for a prediction
    async fn create_recommendation(
        &self,
        patient_id: i64,
        prediction_id: i64,
        plan: &DurablePlan,
    ) -> AppResult<StoredRecommendation>;
}
