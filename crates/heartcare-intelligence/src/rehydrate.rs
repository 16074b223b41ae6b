// ABOUTME: Resolves a stored durable plan against the current exercise template catalog
// ABOUTME: Identifiers that no longer resolve are skipped; order of survivors is preserved
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::catalog::{index_by_id, ExerciseTemplate, TemplateIndex};
use crate::plan::{DisplayPlan, DurablePlan, PlanItem};
use tracing::debug;

/// Rehydrate a durable plan against a catalog snapshot.
///
/// Returns `None` when the plan was never computed (no summary and no
/// identifiers). A plan whose identifiers all fail to resolve still returns
/// `Some` with its summary and zero items.
#[must_use]
pub fn rehydrate(plan: &DurablePlan, catalog: &[ExerciseTemplate]) -> Option<DisplayPlan> {
    if plan.is_empty() {
        return None;
    }
    rehydrate_indexed(plan, &index_by_id(catalog))
}

/// Rehydrate against a prebuilt index, for callers resolving many plans
/// against one catalog read
#[must_use]
pub fn rehydrate_indexed(plan: &DurablePlan, index: &TemplateIndex<'_>) -> Option<DisplayPlan> {
    if plan.is_empty() {
        return None;
    }

    let items: Vec<PlanItem> = plan
        .template_ids
        .iter()
        .filter_map(|id| index.get(id).map(|template| PlanItem::from(*template)))
        .collect();

    let dropped = plan.template_ids.len() - items.len();
    if dropped > 0 {
        debug!(dropped, "skipped plan templates missing from the current catalog");
    }

    Some(DisplayPlan {
        summary: plan.summary.clone(),
        items,
    })
}
