//! HTTP listener startup, plain or TLS.
//!
//! Both paths drain in-flight requests once the shutdown token is cancelled;
//! callers bound that drain with their own grace period.

use crate::config::TlsPaths;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::io;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Load the certificate chain and private key for HTTPS.
pub async fn load_tls(paths: &TlsPaths) -> io::Result<RustlsConfig> {
    // Another component may already have installed a provider; either is fine.
    let _ = rustls::crypto::ring::default_provider().install_default();

    RustlsConfig::from_pem_file(&paths.cert_path, &paths.key_path).await
}

/// Serve `app` on `listener` until `shutdown` is cancelled.
pub fn spawn(
    listener: TcpListener,
    app: Router,
    tls: Option<RustlsConfig>,
    shutdown: CancellationToken,
) -> io::Result<JoinHandle<io::Result<()>>> {
    let Some(tls) = tls else {
        warn!("Token Authority running WITHOUT TLS");
        return Ok(tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        }));
    };

    info!("TLS enabled");
    let handle = axum_server::Handle::new();
    let watcher = handle.clone();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        watcher.graceful_shutdown(None);
    });

    let server = axum_server::from_tcp_rustls(listener.into_std()?, tls).handle(handle);
    Ok(tokio::spawn(async move {
        server.serve(app.into_make_service()).await
    }))
}
