// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Prediction ingestion pipeline and patient report assembly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain service layer
//!
//! Services receive their collaborators explicitly and hold no cross-request
//! mutable state, so route handlers stay thin.

/// Score, persist, recommend, persist plan
pub mod prediction_ingestion;

/// Patient report view model and HTML rendering
pub mod reports;

pub use prediction_ingestion::{IngestionOutcome, PredictionIngestion};
pub use reports::{render_html, PatientReport, ReportBuilder};
