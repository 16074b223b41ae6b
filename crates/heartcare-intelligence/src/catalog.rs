// ABOUTME: Exercise template catalog entry type and identifier index
// ABOUTME: Templates are read-only here; administration lives in the server crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the exercise template catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    /// Stable integer identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Free-form intensity label such as "low" or "medium"
    pub intensity: String,
    /// Description shown as the plan item's notes
    #[serde(default)]
    pub description: String,
    /// Session duration in minutes
    pub duration_min: i32,
    /// Sessions per week
    pub freq_per_week: i32,
    /// Risk level this template targets; empty applies to any risk level
    #[serde(default)]
    pub target_risk_level: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ExerciseTemplate {
    /// True when this template is a candidate for the given risk label.
    ///
    /// `normalized_risk` must already be lower-cased.
    #[must_use]
    pub fn targets(&self, normalized_risk: &str) -> bool {
        self.target_risk_level.is_empty()
            || self.target_risk_level.eq_ignore_ascii_case(normalized_risk)
    }
}

/// Lookup from template identifier to template
pub type TemplateIndex<'a> = HashMap<i64, &'a ExerciseTemplate>;

/// Index templates by identifier.
///
/// When the source holds duplicate identifiers the last one seen wins.
#[must_use]
pub fn index_by_id(templates: &[ExerciseTemplate]) -> TemplateIndex<'_> {
    let mut index = HashMap::with_capacity(templates.len());
    for template in templates {
        index.insert(template.id, template);
    }
    index
}

#[cfg(test)]
pub(crate) fn template(id: i64, name: &str, target: &str) -> ExerciseTemplate {
    ExerciseTemplate {
        id,
        name: name.to_owned(),
        intensity: "low".to_owned(),
        description: format!("{name} notes"),
        duration_min: 30,
        freq_per_week: 3,
        target_risk_level: target.to_owned(),
        tags: vec![],
    }
}
