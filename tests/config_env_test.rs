// ABOUTME: Tests for environment-driven server configuration loading
// ABOUTME: Serialized because every test mutates process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use std::env;

use heartcare_intelligence::SummaryPolicy;
use heartcare_server::config::{DatabaseUrl, Environment, ServerConfig};
use serial_test::serial;

const VARS: &[&str] = &[
    "HTTP_PORT",
    "HOST",
    "ENVIRONMENT",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "SCORER_BASE_URL",
    "SCORER_TIMEOUT_SECS",
    "SCORER_CONNECT_TIMEOUT_SECS",
    "JWT_SECRET",
    "JWT_EXPIRY_HOURS",
    "BCRYPT_COST",
    "RECOMMENDATION_SUMMARY",
    "RECOMMENDATION_SUMMARY_TEXT",
    "CORS_ALLOWED_ORIGINS",
    "REQUEST_TIMEOUT_SECS",
    "CLINIC_NAME",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_when_environment_is_empty() {
    clear_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8080);
    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.scorer.base_url, "http://localhost:8000");
    assert_eq!(config.scorer.timeout_secs, 10);
    assert_eq!(config.recommendation.summary_policy, SummaryPolicy::RiskGuidance);
    assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
    assert!(!config.database.url.is_memory());
}

#[test]
#[serial]
fn test_overrides_are_applied() {
    clear_env();
    env::set_var("HTTP_PORT", "9090");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("SCORER_BASE_URL", "http://scorer.internal:9000/");
    env::set_var("SCORER_TIMEOUT_SECS", "3");
    env::set_var("RECOMMENDATION_SUMMARY_TEXT", "Stay active");
    env::set_var("CORS_ALLOWED_ORIGINS", "https://a.test, https://b.test");
    env::set_var("CLINIC_NAME", "Riverside Cardiology");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9090);
    assert!(config.environment.is_production());
    assert_eq!(config.database.url, DatabaseUrl::Memory);
    assert_eq!(config.scorer.base_url, "http://scorer.internal:9000");
    assert_eq!(config.scorer.timeout_secs, 3);
    assert_eq!(
        config.recommendation.summary_policy,
        SummaryPolicy::Fixed("Stay active".to_owned())
    );
    assert_eq!(
        config.cors.allowed_origins,
        vec!["https://a.test", "https://b.test"]
    );
    assert_eq!(config.clinic_name, "Riverside Cardiology");
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_env();

    env::set_var("HTTP_PORT", "not-a-port");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("HTTP_PORT");

    env::set_var("SCORER_BASE_URL", "scorer:8000");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("SCORER_BASE_URL");

    env::set_var("RECOMMENDATION_SUMMARY", "shouting");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("RECOMMENDATION_SUMMARY");

    env::set_var("JWT_EXPIRY_HOURS", "0");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
}
