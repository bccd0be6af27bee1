//! Civica daemon — entry point for running the civic-issue engine.

mod config;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use civica_dedup::{CategoryScorer, DuplicateResolver};
use civica_evidence::{EvidenceValidator, SidecarExtractor};
use civica_gateway::{GatewayServer, GatewayState};
use civica_hub::StatusBroadcastHub;
use civica_identity::{IdentityVerifier, NullVerifier, RemoteVerifier};
use civica_node::{EngineMetrics, ResolutionCoordinator, SubmissionPipeline};
use civica_store::{MemoryStore, ReportStore};

use config::DaemonConfig;

#[derive(Parser)]
#[command(name = "civica-daemon", about = "Civica civic-issue engine daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long, env = "CIVICA_CONFIG")]
    config: Option<PathBuf>,

    /// Port the gateway listens on.
    #[arg(long, env = "CIVICA_PORT")]
    port: Option<u16>,

    /// Remote identity classifier base URL.
    #[arg(long, env = "CIVICA_CLASSIFIER_URL")]
    classifier_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CIVICA_LOG_LEVEL")]
    log_level: Option<String>,
}

/// Initialize the tracing subscriber. Respects `RUST_LOG` when set,
/// otherwise uses the configured level.
fn init_tracing(level: &str, format: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)?,
        None => DaemonConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listen_port = port;
    }
    if let Some(url) = cli.classifier_url {
        config.classifier_endpoint = Some(url);
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_tracing(&config.log_level, &config.log_format);
    let params = config.params.clone();

    let store: Arc<dyn ReportStore> = Arc::new(MemoryStore::new());
    let metrics = Arc::new(EngineMetrics::new());
    let hub = Arc::new(StatusBroadcastHub::new(params.event_channel_capacity));

    let resolver = DuplicateResolver::new(
        params.duplicate_radius_meters,
        params.similarity_confidence_threshold,
        Arc::new(CategoryScorer),
    );
    let pipeline = Arc::new(SubmissionPipeline::new(
        store.clone(),
        resolver,
        metrics.clone(),
    ));

    let validator = EvidenceValidator::new(
        params.resolution_radius_meters,
        Arc::new(SidecarExtractor),
    );
    let identity: Arc<dyn IdentityVerifier> = match &config.classifier_endpoint {
        Some(endpoint) => {
            info!(%endpoint, "using remote identity classifier");
            Arc::new(RemoteVerifier::new(endpoint))
        }
        None => {
            warn!("no classifier endpoint configured, every capture passes identity verification");
            Arc::new(NullVerifier::accepting())
        }
    };
    let coordinator = Arc::new(ResolutionCoordinator::new(
        store.clone(),
        validator,
        identity,
        hub.clone(),
        params.clone(),
        metrics.clone(),
    ));

    let state = Arc::new(GatewayState {
        hub,
        store,
        pipeline,
        coordinator,
        metrics,
        poll_interval_secs: params.poll_interval_secs,
    });
    let server = GatewayServer::new(config.listen_port, state);

    info!(
        port = config.listen_port,
        duplicate_radius_meters = params.duplicate_radius_meters,
        resolution_radius_meters = params.resolution_radius_meters,
        identity_required = params.identity_verification_required,
        "civica daemon starting"
    );

    tokio::select! {
        result = server.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}
