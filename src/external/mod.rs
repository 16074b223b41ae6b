// ABOUTME: External service clients used by the server
// ABOUTME: Currently the cardiovascular risk scorer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod scorer_client;

pub use scorer_client::{
    FeaturePayload, HttpScorerClient, RiskScorer, ScorerFeatures, ScoringResult,
};
