use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expresso_core::manifest::HttpManifestClient;
use expresso_core::repository::HttpRepositoryClient;
use expresso_core::token::{ClientCredentialsTokenSource, TokenCache, TokenProvider};
use expresso_core::{
    load_config, validate_config, AuditWorkflow, FsReportStore, JobStore, ManifestService,
    Repository, SqliteKvStore,
};

use expresso_server::api::create_router;
use expresso_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("EXPRESSO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);

    // Compute config hash for startup logging
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Starting expresso"
    );

    // SQLite KV store backing the token cache and the job correlation store
    let kv = Arc::new(
        SqliteKvStore::new(&config.database.path).context("Failed to open key-value store")?,
    );
    info!("Key-value store initialized");

    let http = reqwest::Client::new();

    // Repository client: static token when configured, cached exchange otherwise
    let repository_tokens = match &config.repository.static_token {
        Some(token) => {
            info!("Repository auth: static token");
            TokenProvider::Static(token.clone())
        }
        None => {
            info!("Repository auth: client-credentials exchange");
            TokenProvider::Cached {
                cache: TokenCache::new(Arc::clone(&kv) as Arc<dyn expresso_core::KvStore>),
                source: ClientCredentialsTokenSource::new(
                    http.clone(),
                    config.repository.credentials.clone(),
                ),
                cache_key: "repository-token".to_string(),
            }
        }
    };
    let repository: Arc<dyn Repository> = Arc::new(HttpRepositoryClient::new(
        http.clone(),
        repository_tokens,
        config.repository.credentials.client_id.clone(),
    ));

    // Manifest service client
    let manifest_tokens = TokenProvider::Cached {
        cache: TokenCache::new(Arc::clone(&kv) as Arc<dyn expresso_core::KvStore>),
        source: ClientCredentialsTokenSource::new(
            http.clone(),
            config.manifest_service.credentials.clone(),
        ),
        cache_key: "manifest-token".to_string(),
    };
    let manifests: Arc<dyn ManifestService> = Arc::new(HttpManifestClient::new(
        http,
        manifest_tokens,
        config.manifest_service.endpoint.clone(),
        config.manifest_service.credentials.client_id.clone(),
        config.manifest_service.org_id.clone(),
    ));
    info!(endpoint = %config.manifest_service.endpoint, "Manifest client initialized");

    // Report store, when enabled
    let reports = if config.reports.enabled {
        let store = FsReportStore::new(config.reports.dir.clone())
            .context("Failed to open report store")?;
        info!("Report store at {:?}", config.reports.dir);
        Some(Arc::new(store))
    } else {
        info!("Report store disabled");
        None
    };

    // Workflow
    let workflow = AuditWorkflow::new(
        repository,
        manifests,
        JobStore::new(Arc::clone(&kv) as Arc<dyn expresso_core::KvStore>),
        reports.clone(),
    );

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), workflow, reports));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
