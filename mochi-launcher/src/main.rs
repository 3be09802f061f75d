use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mochi_launcher::api;
use mochi_launcher::backend::{
    ArtifactStore, BatchBackend, HttpArtifactStore, HttpBatchBackend, InMemoryArtifactStore,
    InMemoryBatchBackend,
};
use mochi_launcher::config::{BackendMode, LauncherConfig};
use mochi_launcher::service::PipelineLauncher;
use mochi_launcher::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mochi_launcher=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Mochi Launcher...");

    let config = LauncherConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let (batch, store): (Arc<dyn BatchBackend>, Arc<dyn ArtifactStore>) = match &config.backend {
        BackendMode::Http {
            batch_url,
            artifact_url,
        } => {
            tracing::info!("Batch backend: {}", batch_url);
            tracing::info!("Artifact store: {}", artifact_url);
            (
                Arc::new(HttpBatchBackend::new(batch_url.as_str())) as Arc<dyn BatchBackend>,
                Arc::new(HttpArtifactStore::new(artifact_url.as_str())) as Arc<dyn ArtifactStore>,
            )
        }
        BackendMode::Memory => {
            tracing::warn!(
                "Running with in-memory backends for development only, no jobs will actually run"
            );
            (
                Arc::new(InMemoryBatchBackend::new()) as Arc<dyn BatchBackend>,
                Arc::new(InMemoryArtifactStore::new()) as Arc<dyn ArtifactStore>,
            )
        }
    };

    tracing::info!("Submitting to job queue {}", config.job_queue);

    let addr = config.bind_addr.clone();
    let launcher = PipelineLauncher::new(Arc::new(config), batch, store);

    // Build router with all API endpoints
    let app = api::create_router(AppState::new(launcher));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
