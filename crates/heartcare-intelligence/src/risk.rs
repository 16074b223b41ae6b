// ABOUTME: Risk level labels produced by the scoring service
// ABOUTME: Parsing is lenient; unknown labels are passed through as free text elsewhere
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low cardiovascular risk
    Low,
    /// Medium cardiovascular risk
    Medium,
    /// High cardiovascular risk
    High,
    /// No risk assessment applies
    None,
}

impl RiskLevel {
    /// All recognised levels
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::None];

    /// Parse a label, ignoring case and surrounding whitespace
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(label))
    }

    /// Lower-case wire form
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::None => "none",
        }
    }

    /// Human-readable label used on reports
    #[must_use]
    pub const fn display_label(&self) -> &'static str {
        match self {
            Self::Low => "Low risk",
            Self::Medium => "Medium risk",
            Self::High => "High risk",
            Self::None => "No risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
