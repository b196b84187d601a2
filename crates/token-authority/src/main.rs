//! Token Authority
//!
//! Issues RS256 access tokens for the OAuth 2.0 client credentials grant and
//! publishes the signing key at `/.well-known/jwks.json`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use token_authority::config::Config;
use token_authority::crypto::resolve_key_pair;
use token_authority::models::AuthorizationDirectory;
use token_authority::observability::init_tracing;
use token_authority::routes::{self, AppState};
use token_authority::server;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (before tracing, so LOG_FORMAT applies)
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    let _log_guard = init_tracing(config.log_format, config.log_file.as_deref()).map_err(|e| {
        eprintln!("Failed to initialize logging: {}", e);
        e
    })?;

    info!("Starting Token Authority");
    info!(
        bind_address = %config.bind_address,
        token_lifetime_seconds = config.token_lifetime_seconds,
        shutdown_grace_seconds = config.shutdown_grace_seconds,
        tls = config.tls.is_some(),
        "Configuration loaded successfully"
    );

    let directory = AuthorizationDirectory::from_json_file(&config.directory_path).map_err(|e| {
        error!("Failed to load authorization directory: {}", e);
        e
    })?;

    info!(
        issuer = %directory.issuer,
        clients = directory.clients.len(),
        "Authorization directory loaded"
    );

    // Install before key resolution so the resolution counter is exported
    let metrics_handle = routes::init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    // Key generation is CPU-bound; keep it off the async workers
    let key_source = config.key_source.clone();
    let key_pair = tokio::task::spawn_blocking(move || resolve_key_pair(&key_source))
        .await?
        .map_err(|e| {
            error!("Failed to resolve signing key: {}", e);
            e
        })?;

    info!(
        kid = %key_pair.thumbprint(),
        origin = key_pair.origin().as_str(),
        "Signing key ready"
    );

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;
    let grace = Duration::from_secs(config.shutdown_grace_seconds);

    let tls = match &config.tls {
        Some(paths) => Some(server::load_tls(paths).await.map_err(|e| {
            error!("Failed to load TLS certificate or key: {}", e);
            e
        })?),
        None => None,
    };

    let state = Arc::new(AppState {
        key_pair,
        directory,
        config,
    });

    let app = routes::build_routes(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Token Authority listening on {}", addr);

    let shutdown = CancellationToken::new();
    let mut server = server::spawn(listener, app, tls, shutdown.clone())?;

    tokio::select! {
        result = &mut server => {
            // Server exited without a shutdown signal
            result??;
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    shutdown.cancel();
    info!(grace_seconds = grace.as_secs(), "Draining in-flight requests");

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => {
            result??;
            info!("Token Authority shutdown complete");
        }
        Err(_) => {
            warn!("Grace period elapsed with requests in flight, aborting");
            server.abort();
        }
    }

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
