// ABOUTME: Durable and display forms of an exercise recommendation plan
// ABOUTME: The durable form is the only persisted shape; display items are resolved snapshots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Plan representations.
//!
//! A [`DurablePlan`] stores template identifiers only, never copies of
//! template fields. Its JSON encoding is exactly
//! `{"summary": "...", "template_ids": [..]}` and every reader parses it
//! through [`DurablePlan::from_json`].

use crate::catalog::ExerciseTemplate;
use heartcare_core::errors::AppResult;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of templates a plan references
pub const MAX_PLAN_ITEMS: usize = 3;

/// Persisted plan: summary plus ordered template references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurablePlan {
    /// Summary text, may be empty
    #[serde(default)]
    pub summary: String,
    /// Ordered template identifiers, at most [`MAX_PLAN_ITEMS`]
    #[serde(default)]
    pub template_ids: Vec<i64>,
}

impl DurablePlan {
    /// True when the plan was never computed: no summary and no identifiers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.template_ids.is_empty()
    }

    /// Encode into the persisted JSON shape
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from the persisted JSON shape; absent fields default to empty
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the blob is not a valid plan
    pub fn from_json(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// One resolved exercise in a display plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    /// Template this item was resolved from
    pub template_id: i64,
    /// Exercise name
    pub name: String,
    /// Intensity label
    pub intensity: String,
    /// Minutes per session
    pub duration_min: i32,
    /// Sessions per week
    pub freq_per_week: i32,
    /// Notes taken from the template description
    pub notes: String,
}

impl From<&ExerciseTemplate> for PlanItem {
    fn from(template: &ExerciseTemplate) -> Self {
        Self {
            template_id: template.id,
            name: template.name.clone(),
            intensity: template.intensity.clone(),
            duration_min: template.duration_min,
            freq_per_week: template.freq_per_week,
            notes: template.description.clone(),
        }
    }
}

/// In-memory plan with fully resolved items, never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPlan {
    /// Summary text copied from the durable plan
    pub summary: String,
    /// Resolved items in durable order
    pub items: Vec<PlanItem>,
}

impl DisplayPlan {
    /// Identifiers of the resolved items, in order
    #[must_use]
    pub fn template_ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.template_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durable_plan_json_shape() {
        let plan = DurablePlan {
            summary: "Walk daily".to_owned(),
            template_ids: vec![4, 2],
        };

        let json = plan.to_json().unwrap();
        assert_eq!(json, r#"{"summary":"Walk daily","template_ids":[4,2]}"#);
    }

    #[test]
    fn test_empty_plan_still_emits_both_fields() {
        let json = DurablePlan::default().to_json().unwrap();
        assert_eq!(json, r#"{"summary":"","template_ids":[]}"#);
    }

    #[test]
    fn test_from_json_tolerates_missing_fields() {
        let plan = DurablePlan::from_json(r#"{"template_ids":[7]}"#).unwrap();
        assert_eq!(plan.summary, "");
        assert_eq!(plan.template_ids, vec![7]);

        assert!(DurablePlan::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(DurablePlan::from_json("not a plan").is_err());
    }
}
