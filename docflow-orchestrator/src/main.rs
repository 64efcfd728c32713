//! Docflow Orchestrator
//!
//! Registers document-processing pipelines and executes them on demand.
//!
//! Architecture:
//! - API: Axum handlers for pipelines, runs, documents and rulesets
//! - Services: Admin logic and the run lifecycle
//! - Engine: Node dispatch over a per-run execution context
//! - Store: Postgres (via repositories) or in-memory persistence

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod repository;
pub mod service;
pub mod store;

use crate::config::Config;
use crate::engine::vector_index::{HttpVectorIndex, NoopVectorIndex, VectorIndex};
use crate::engine::{Orchestrator, RulesetRegistry, StagingSink};
use crate::service::RunService;
use crate::store::{MemoryStore, PgStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docflow_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Docflow Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let store = open_store(&config).await?;

    let index: Arc<dyn VectorIndex> = match &config.vector_index_url {
        Some(url) => {
            tracing::info!(
                "Vector index at {} (collection {})",
                url,
                config.vector_index_collection
            );
            Arc::new(HttpVectorIndex::new(
                url.clone(),
                config.vector_index_collection.clone(),
            ))
        }
        None => {
            tracing::info!("No vector index configured, embeddings will be dropped");
            Arc::new(NoopVectorIndex)
        }
    };

    let orchestrator = Orchestrator::new(
        store.clone(),
        RulesetRegistry::new(),
        StagingSink::new(index, config.embedding_dim)
            .with_index_timeout(config.vector_index_timeout),
    );
    let runs = Arc::new(RunService::new(
        store.clone(),
        orchestrator,
        config.run_timeout,
    ));

    // Build router with all API endpoints
    let app = api::create_router(api::AppState {
        store,
        runs,
        services: api::ServiceStatus::from_config(&config),
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    };

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(database_url, config.database_max_connections)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(Arc::new(PgStore::new(pool)))
}
