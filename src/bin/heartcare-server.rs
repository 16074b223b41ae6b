// ABOUTME: HeartCare server binary: configuration, logging, database and HTTP startup
// ABOUTME: Serves the patient risk API until interrupted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # HeartCare Server Binary
//!
//! Loads configuration from the environment, opens and migrates the
//! database, wires the scorer client and serves the HTTP API.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use heartcare_server::{
    config::ServerConfig,
    database::Database,
    external::{HttpScorerClient, RiskScorer},
    logging,
    resources::ServerResources,
    server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "heartcare-server")]
#[command(about = "HeartCare - patient cardiovascular risk and exercise plan API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());

    let database = Database::new(&config.database.url, config.database.max_connections).await?;

    let scorer: Arc<dyn RiskScorer> = Arc::new(HttpScorerClient::new(config.scorer.clone())?);
    info!(base_url = %config.scorer.base_url, "Risk scorer client configured");

    let resources = Arc::new(ServerResources::new(config, database, scorer));

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
