// ABOUTME: Main library entry point for the HeartCare patient risk backend
// ABOUTME: Provides the REST API, risk scoring pipeline and exercise plan handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Crate-level attributes:
// - deny(unsafe_code): Zero-tolerance unsafe policy
#![deny(unsafe_code)]

//! # HeartCare Server
//!
//! A clinical backend that stores patients, obtains cardiovascular risk
//! scores from an external scoring service and turns each score into an
//! exercise plan drawn from an editable template catalog.
//!
//! ## Architecture
//!
//! - **Intelligence** (`heartcare-intelligence` crate): pure recommendation
//!   engine, plan shapes and plan rehydration
//! - **Database**: `SQLite` managers for users, patients, predictions,
//!   templates and stored plans
//! - **Services**: the prediction ingestion pipeline and patient reports
//! - **Routes**: Axum routers for auth, patients, predictions, exercises,
//!   reports and stats
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use heartcare_server::config::ServerConfig;
//! use heartcare_server::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("HeartCare configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the server binary and integration tests.

/// JWT issuing, validation and password hashing
pub mod auth;

/// Template catalog backed by the exercise template table
pub mod catalog;

/// Environment-driven server configuration
pub mod config;

/// Application constants re-exported from `heartcare-core`
pub mod constants;

/// `SQLite` persistence managers
pub mod database;

/// Unified error handling
pub mod errors;

/// External service clients (risk scorer)
pub mod external;

/// Structured logging setup
pub mod logging;

/// HTTP middleware (CORS, request tracing)
pub mod middleware;

/// API data models
pub mod models;

/// Shared server resources handed to every router
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Business services (prediction ingestion, reports)
pub mod services;

/// Store traits consumed by the ingestion pipeline
pub mod stores;
