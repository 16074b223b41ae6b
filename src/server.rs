// ABOUTME: HTTP server assembly: router, middleware layers and graceful shutdown
// ABOUTME: Each request runs as one future; the timeout layer drops it when the deadline passes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Server assembly
//!
//! The whole-request timeout and client disconnects both drop the handler
//! future. An ingestion abandoned while the scorer call is outstanding
//! therefore never reaches the persistence steps.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::middleware::{make_request_span, propagate_request_id, setup_cors};
use crate::resources::ServerResources;
use crate::routes::{
    AuthRoutes, ExerciseRoutes, HealthRoutes, PatientRoutes, PredictionRoutes, ReportRoutes,
    StatsRoutes,
};
use anyhow::{Context, Result};
use axum::{middleware::from_fn, Router};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Build the full application router with middleware applied
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config);
    let timeout = TimeoutLayer::new(resources.config.request_timeout());

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(PatientRoutes::routes(Arc::clone(&resources)))
        .merge(PredictionRoutes::routes(Arc::clone(&resources)))
        .merge(ExerciseRoutes::routes(Arc::clone(&resources)))
        .merge(ReportRoutes::routes(Arc::clone(&resources)))
        .merge(StatsRoutes::routes(resources))
        .layer(timeout)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(propagate_request_id))
}

/// Bind and serve until Ctrl-C
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let host = resources.config.host.clone();
    let port = resources.config.http_port;
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid bind address {host}:{port}"))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
