// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-only configuration with typed sections per collaborator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the HeartCare server

/// Environment and server configuration
pub mod environment;

pub use environment::{
    AuthConfig, CorsConfig, DatabaseConfig, DatabaseUrl, Environment, RecommendationConfig,
    ScorerConfig, ServerConfig,
};
