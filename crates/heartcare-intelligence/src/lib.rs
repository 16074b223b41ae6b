// ABOUTME: Recommendation engine and plan rehydrator for HeartCare exercise plans
// ABOUTME: Pure in-memory transforms over an already-fetched exercise template catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # HeartCare Intelligence
//!
//! The decision core of the backend. Given a risk label and the current
//! exercise template catalog it derives a bounded exercise plan, and given a
//! stored plan it resolves the plan back against whatever the catalog holds
//! today.
//!
//! Nothing in this crate performs I/O or suspends. Callers fetch the catalog
//! (see the `TemplateCatalog` trait in the server crate) and pass a slice in.
//!
//! ## Modules
//!
//! - **catalog**: `ExerciseTemplate` and `index_by_id`
//! - **risk**: `RiskLevel` labels used for template targeting
//! - **plan**: durable (persisted) and display (resolved) plan forms
//! - **`recommendation_engine`**: `build_recommendation` and `SummaryPolicy`
//! - **rehydrate**: resolving a durable plan against the current catalog

/// Exercise template catalog entries and lookup
pub mod catalog;

/// Risk level labels
pub mod risk;

/// Durable and display plan representations
pub mod plan;

/// Plan assembly from a risk label and catalog
pub mod recommendation_engine;

/// Durable plan resolution against the current catalog
pub mod rehydrate;

pub use catalog::{index_by_id, ExerciseTemplate, TemplateIndex};
pub use plan::{DisplayPlan, DurablePlan, PlanItem, MAX_PLAN_ITEMS};
pub use recommendation_engine::{build_recommendation, Recommendation, SummaryPolicy};
pub use rehydrate::{rehydrate, rehydrate_indexed};
pub use risk::RiskLevel;
