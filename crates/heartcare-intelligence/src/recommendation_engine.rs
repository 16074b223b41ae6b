// ABOUTME: Builds bounded exercise plans from a risk label and the template catalog
// ABOUTME: Filter by target risk, fall back to the whole catalog, keep catalog order, cap at three
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Recommendation engine
//!
//! [`build_recommendation`] selects templates in catalog iteration order:
//!
//! 1. keep templates whose target risk level is empty or equal to the
//!    lower-cased risk label
//! 2. if nothing survives, use the whole catalog instead
//! 3. take the first [`MAX_PLAN_ITEMS`]
//!
//! The display plan and durable plan are built in lock-step from the same
//! selection. An empty catalog produces an empty plan, never an error.

use crate::catalog::ExerciseTemplate;
use crate::plan::{DisplayPlan, DurablePlan, PlanItem, MAX_PLAN_ITEMS};
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};
use tracing::debug;

const HIGH_RISK_GUIDANCE: &str =
    "Light intensity 5-6 sessions per week; monitor heart rate and consult your physician.";
const MEDIUM_RISK_GUIDANCE: &str =
    "Light to moderate intensity 4-5 sessions per week, combining cardio and stretching.";
const DEFAULT_GUIDANCE: &str =
    "Maintain light intensity 4-5 sessions per week; warm up and stretch properly.";

/// How the plan summary text is produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "text")]
pub enum SummaryPolicy {
    /// No summary text
    Empty,
    /// Canned guidance chosen by risk level
    #[default]
    RiskGuidance,
    /// The same operator-supplied text for every plan
    Fixed(String),
}

impl SummaryPolicy {
    /// Summary text for a lower-cased risk label
    #[must_use]
    pub fn summary_for(&self, normalized_risk: &str) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Fixed(text) => text.clone(),
            Self::RiskGuidance => match RiskLevel::from_label(normalized_risk) {
                Some(RiskLevel::High) => HIGH_RISK_GUIDANCE.to_owned(),
                Some(RiskLevel::Medium) => MEDIUM_RISK_GUIDANCE.to_owned(),
                _ => DEFAULT_GUIDANCE.to_owned(),
            },
        }
    }
}

/// Output of [`build_recommendation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// Resolved plan for the response
    pub display: DisplayPlan,
    /// Compact plan for persistence
    pub durable: DurablePlan,
    /// True when no template targeted the risk label and the whole catalog was used
    pub fallback_used: bool,
}

/// Build display and durable plans for a risk label from a catalog snapshot
#[must_use]
pub fn build_recommendation(
    risk_label: &str,
    catalog: &[ExerciseTemplate],
    policy: &SummaryPolicy,
) -> Recommendation {
    let normalized = risk_label.to_lowercase();

    let matching: Vec<&ExerciseTemplate> = catalog
        .iter()
        .filter(|template| template.targets(&normalized))
        .collect();

    let fallback_used = matching.is_empty() && !catalog.is_empty();
    let selected: Vec<&ExerciseTemplate> = if matching.is_empty() {
        catalog.iter().take(MAX_PLAN_ITEMS).collect()
    } else {
        matching.into_iter().take(MAX_PLAN_ITEMS).collect()
    };

    let summary = policy.summary_for(&normalized);
    let items: Vec<PlanItem> = selected.iter().copied().map(PlanItem::from).collect();
    let template_ids = selected.iter().map(|template| template.id).collect();

    debug!(
        risk_label = %normalized,
        catalog_size = catalog.len(),
        item_count = items.len(),
        fallback_used,
        "built exercise recommendation"
    );

    Recommendation {
        display: DisplayPlan {
            summary: summary.clone(),
            items,
        },
        durable: DurablePlan {
            summary,
            template_ids,
        },
        fallback_used,
    }
}
