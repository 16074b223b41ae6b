// ABOUTME: Read-only exercise template catalog accessor used by recommendation paths
// ABOUTME: Returns templates in catalog order; read failures surface as CatalogUnavailable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Template catalog accessor
//!
//! The recommendation engine and the plan rehydrator only ever see a snapshot
//! returned by [`TemplateCatalog::list_templates`]. Lookup by identifier is
//! done on that snapshot with `heartcare_intelligence::index_by_id`.

use crate::errors::AppResult;
use async_trait::async_trait;
use heartcare_intelligence::ExerciseTemplate;

/// Read-only view of the current template catalog
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Snapshot of every template in catalog iteration order
    ///
    /// # Errors
    ///
    /// Returns `CatalogUnavailable` if the catalog cannot be read
    async fn list_templates(&self) -> AppResult<Vec<ExerciseTemplate>>;
}
