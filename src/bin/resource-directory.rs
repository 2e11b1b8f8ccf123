// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Directory Service
//!
//! Connects to NATS, opens the configured resource store and runs the
//! assignment and deallocation listeners until interrupted. The directory
//! it builds is the one the HTTP layer calls into.
//!
//! Run with: cargo run --bin resource-directory
//!
//! Prerequisites:
//! 1. NATS server running (default: localhost:4222)
//! 2. For `STORAGE_BACKEND=mongodb`, a build with `--features mongodb` and a
//!    reachable MongoDB (via MONGODB_URI)

use anyhow::{Context, Result};
use resource_directory::{
    config::{DirectoryConfig, StorageBackend},
    messaging::{MessageProcessor, Messenger, NatsTransport},
    nats::NatsClient,
    repository::{InMemoryResourceRepository, ResourceRepository},
    service::{
        spawn_status_listeners, ResourceDirectory, ResourceDirectoryService, ScoringClient,
        StatusSynchronizer,
    },
};
use std::sync::Arc;
use tracing::{error, info};

async fn open_repository(storage: &StorageBackend) -> Result<Arc<dyn ResourceRepository>> {
    match storage {
        StorageBackend::Memory => {
            info!("Using in-memory resource store");
            Ok(Arc::new(InMemoryResourceRepository::new()))
        }
        #[cfg(feature = "mongodb")]
        StorageBackend::MongoDb { uri, database } => {
            info!(database = %database, "Using MongoDB resource store");
            let repo = resource_directory::repository::MongoResourceRepository::connect(uri, database)
                .await
                .context("Failed to open MongoDB resource store")?;
            Ok(Arc::new(repo))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::MongoDb { .. } => {
            anyhow::bail!("STORAGE_BACKEND=mongodb requires building with --features mongodb")
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting resource directory");

    let config = DirectoryConfig::from_env().context("Invalid configuration")?;
    info!("Configuration loaded:");
    info!("  - NATS servers: {:?}", config.nats.servers);
    info!("  - Score route: {}", config.topology.score);
    info!("  - Resource events: {}", config.topology.new_resource);
    info!("  - Score timeout: {:?}", config.exchange_timeout);

    let client = NatsClient::new(config.nats.clone())
        .await
        .context("Failed to connect to NATS")?;
    let transport = Arc::new(NatsTransport::new(client));
    let messenger = Messenger::with_timeout(transport.clone(), config.exchange_timeout);

    let repository = open_repository(&config.storage).await?;

    let directory = ResourceDirectory::new(
        repository.clone(),
        ScoringClient::new(messenger.clone(), config.topology.score.clone()),
        messenger,
        config.topology.new_resource.clone(),
    );
    let known = directory
        .find_all()
        .await
        .context("Failed to read resource store")?
        .len();
    info!(resources = known, "Directory ready");

    let processor = MessageProcessor::new(transport);
    let listeners = spawn_status_listeners(
        &processor,
        StatusSynchronizer::new(repository),
        &config.topology,
    )
    .await
    .context("Failed to start status listeners")?;
    info!(
        assignment = %config.topology.assignment.route,
        deallocation = %config.topology.deallocation.route,
        "Status listeners running"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested");

    for listener in listeners {
        listener.abort();
        if let Err(e) = listener.await {
            if !e.is_cancelled() {
                error!("Listener task failed: {}", e);
            }
        }
    }

    info!("Resource directory stopped");
    Ok(())
}
