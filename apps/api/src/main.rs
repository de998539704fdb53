mod briefing;
mod config;
mod db;
mod errors;
mod interviews;
mod llm_client;
mod memory;
mod models;
mod routes;
mod state;
mod storage;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::briefing::orchestrator::BriefingPipeline;
use crate::config::Config;
use crate::db::connect_and_migrate;
use crate::llm_client::{AnthropicBackend, FixedBackoff, InferenceClient};
use crate::memory::PgMemoryStore;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{ArtifactStore, LocalArtifactStore, PgInterviewStore, S3ArtifactStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AXIS API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (interview records + institutional memory)
    let pool = connect_and_migrate(&config.database_url, config.database_max_connections).await?;
    let interviews = Arc::new(PgInterviewStore::new(pool.clone()));
    let memory = Arc::new(PgMemoryStore::new(pool));

    // Initialize artifact storage
    let artifacts: Arc<dyn ArtifactStore> = match &config.local_artifact_dir {
        Some(dir) => {
            info!("Artifact store: local directory {dir}");
            Arc::new(LocalArtifactStore::new(dir))
        }
        None => {
            let s3 = build_s3_client(&config).await;
            info!("Artifact store: s3://{}", config.s3_bucket);
            Arc::new(S3ArtifactStore::new(s3, config.s3_bucket.clone()))
        }
    };

    // Initialize inference client with its fallback chain
    let backend = AnthropicBackend::new(config.anthropic_api_key.clone(), config.inference_timeout)?;
    let llm = InferenceClient::new(
        Arc::new(backend),
        config.inference_models.clone(),
        Arc::new(FixedBackoff(config.inference_backoff)),
    );
    info!("Inference client initialized (models: {:?})", llm.models());

    let pipeline = BriefingPipeline::new(
        llm,
        artifacts.clone(),
        interviews.clone(),
        memory.clone(),
        config.memory_query_limit,
    );

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        interviews,
        artifacts,
        memory,
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client for AWS, or for MinIO when `S3_ENDPOINT` is set.
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let (Some(key_id), Some(secret)) = (&config.aws_access_key_id, &config.aws_secret_access_key)
    {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "axis-static",
        ));
    }
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let shared = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(config.s3_endpoint.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}
