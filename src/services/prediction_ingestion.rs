// ABOUTME: Prediction ingestion pipeline: score, persist, recommend, persist plan
// ABOUTME: Strictly sequential; scorer and prediction write failures are fatal, plan write failure is not
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Prediction ingestion
//!
//! One ingestion request runs these steps in order, each depending on the
//! previous step's output:
//!
//! 1. translate the client payload into the scorer request shape
//! 2. call the scorer once (failure aborts with `ScoringUnavailable`)
//! 3. persist the prediction (failure aborts with `DatabaseError`)
//! 4. build a plan from the just-returned risk label and a fresh catalog snapshot
//!    (an unreadable catalog counts as empty: summary only, nothing persisted)
//! 5. persist the durable plan (failure is logged and reported as
//!    `plan_persisted = false`)
//!
//! The returned plan is the one computed in step 4, never re-read from storage.
//! The whole pipeline is a single future, so dropping it (request timeout or
//! client disconnect) abandons every step that has not started yet.

use std::sync::Arc;

use crate::catalog::TemplateCatalog;
use crate::errors::AppResult;
use crate::external::{FeaturePayload, RiskScorer};
use crate::models::{NewPrediction, Prediction};
use crate::stores::{PredictionStore, RecommendationStore};
use heartcare_intelligence::{
    build_recommendation, DisplayPlan, DurablePlan, Recommendation, SummaryPolicy,
};
use tracing::{debug, info, warn};

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    /// The persisted prediction
    pub prediction: Prediction,
    /// Plan computed for this prediction; no items when the catalog could not be read
    pub plan: DisplayPlan,
    /// Whether the durable plan was written
    pub plan_persisted: bool,
}

/// Orchestrates one scoring event end to end
///
/// Every collaborator is injected; the service holds no mutable state and is
/// shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct PredictionIngestion {
    scorer: Arc<dyn RiskScorer>,
    predictions: Arc<dyn PredictionStore>,
    recommendations: Arc<dyn RecommendationStore>,
    catalog: Arc<dyn TemplateCatalog>,
    summary_policy: SummaryPolicy,
}

impl PredictionIngestion {
    /// Create a pipeline over the given collaborators
    #[must_use]
    pub fn new(
        scorer: Arc<dyn RiskScorer>,
        predictions: Arc<dyn PredictionStore>,
        recommendations: Arc<dyn RecommendationStore>,
        catalog: Arc<dyn TemplateCatalog>,
        summary_policy: SummaryPolicy,
    ) -> Self {
        Self {
            scorer,
            predictions,
            recommendations,
            catalog,
            summary_policy,
        }
    }

    /// Score a feature payload for a patient and attach a recommendation
    ///
    /// The payload is expected to have passed [`FeaturePayload::validate`].
    ///
    /// # Errors
    ///
    /// Returns `ScoringUnavailable` if the scorer fails, or a database error
    /// if the prediction cannot be persisted. Catalog and plan persistence
    /// failures never surface here.
    pub async fn ingest(
        &self,
        patient_id: i64,
        payload: &FeaturePayload,
    ) -> AppResult<IngestionOutcome> {
        let features = payload.to_scorer_features();
        let raw_features = serde_json::to_value(&features)?;

        info!(patient_id, "Scoring patient features");
        let scored = self.scorer.score(&features).await?;

        let prediction = self
            .predictions
            .create_prediction(&NewPrediction {
                patient_id,
                probability: scored.probability,
                risk_label: scored.risk_level,
                raw_features,
                factors: scored.factors,
            })
            .await?;

        info!(
            patient_id,
            prediction_id = prediction.id,
            probability = prediction.probability,
            risk_label = %prediction.risk_label,
            "Prediction persisted"
        );

        let (recommendation, catalog_read) = self.build_plan(&prediction).await;
        let plan_persisted =
            catalog_read && self.persist_plan(&prediction, &recommendation.durable).await;

        Ok(IngestionOutcome {
            prediction,
            plan: recommendation.display,
            plan_persisted,
        })
    }

    /// Build the plan from a fresh catalog snapshot
    ///
    /// The flag is `false` when the catalog could not be read; the plan is then
    /// built against an empty catalog and must not be persisted.
    async fn build_plan(&self, prediction: &Prediction) -> (Recommendation, bool) {
        let (templates, catalog_read) = match self.catalog.list_templates().await {
            Ok(templates) => (templates, true),
            Err(e) => {
                warn!(
                    prediction_id = prediction.id,
                    error = %e,
                    "Template catalog unavailable, returning prediction with an empty plan"
                );
                (Vec::new(), false)
            }
        };

        let recommendation =
            build_recommendation(&prediction.risk_label, &templates, &self.summary_policy);

        info!(
            prediction_id = prediction.id,
            items = recommendation.display.items.len(),
            fallback_used = recommendation.fallback_used,
            "Recommendation plan built"
        );

        (recommendation, catalog_read)
    }

    async fn persist_plan(&self, prediction: &Prediction, durable: &DurablePlan) -> bool {
        match self
            .recommendations
            .create_recommendation(prediction.patient_id, prediction.id, durable)
            .await
        {
            Ok(stored) => {
                debug!(
                    prediction_id = prediction.id,
                    recommendation_id = stored.id,
                    "Durable plan persisted"
                );
                true
            }
            Err(e) => {
                warn!(
                    prediction_id = prediction.id,
                    error = %e,
                    "Failed to persist recommendation plan; returning in-memory plan"
                );
                false
            }
        }
    }
}
