// ABOUTME: Centralized resource container for dependency injection into route handlers
// ABOUTME: Holds the database, auth manager, scorer client and the assembled ingestion pipeline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources
//!
//! Built once at startup and shared behind an `Arc`. Every collaborator the
//! handlers use is reachable from here; nothing is looked up through globals.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::catalog::TemplateCatalog;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::external::RiskScorer;
use crate::services::{PredictionIngestion, ReportBuilder};
use crate::stores::{PredictionStore, RecommendationStore};

/// Shared server resources
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Database handle
    pub database: Database,
    /// Token and password handling
    pub auth_manager: Arc<AuthManager>,
    /// External risk scorer
    pub scorer: Arc<dyn RiskScorer>,
    /// Prediction ingestion pipeline wired to the collaborators above
    pub ingestion: Arc<PredictionIngestion>,
}

impl ServerResources {
    /// Wire resources together
    #[must_use]
    pub fn new(config: ServerConfig, database: Database, scorer: Arc<dyn RiskScorer>) -> Self {
        let auth_manager = Arc::new(AuthManager::new(&config.auth));

        let predictions: Arc<dyn PredictionStore> = Arc::new(database.predictions());
        let recommendations: Arc<dyn RecommendationStore> = Arc::new(database.recommendations());
        let catalog: Arc<dyn TemplateCatalog> = Arc::new(database.exercise_templates());
        let ingestion = Arc::new(PredictionIngestion::new(
            Arc::clone(&scorer),
            predictions,
            recommendations,
            catalog,
            config.recommendation.summary_policy.clone(),
        ));

        Self {
            config: Arc::new(config),
            database,
            auth_manager,
            scorer,
            ingestion,
        }
    }

    /// Report builder over this server's database
    #[must_use]
    pub fn report_builder(&self) -> ReportBuilder {
        ReportBuilder::new(self.database.clone(), self.config.clinic_name.clone())
    }
}
