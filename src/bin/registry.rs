//! Schema Registry Server
//!
//! Serves the registry over HTTP, or HTTPS when a certificate and key are
//! configured.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use schema_registry::{transport, RegistryConfig, SchemaStore, Service};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Grace period for in-flight TLS connections on shutdown
const TLS_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "schema-registry")]
#[command(about = "Versioned schema registry server")]
struct Cli {
    /// Path to a config file
    #[arg(short, long)]
    config: Option<String>,

    /// Path to database (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Address for HTTP transport (overrides config)
    #[arg(long)]
    http: Option<String>,

    /// TLS certificate chain in PEM format (overrides config)
    #[arg(long = "tlscert")]
    tls_cert: Option<PathBuf>,

    /// TLS private key in PEM format (overrides config)
    #[arg(long = "tlskey")]
    tls_key: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = RegistryConfig::load_from(cli.config.as_deref()).context("load config")?;
    if let Some(db) = cli.db {
        config.storage.path = db;
    }
    if let Some(http) = cli.http {
        config.http.addr = http;
    }
    if let Some(cert) = cli.tls_cert {
        config.http.tls_cert = Some(cert);
    }
    if let Some(key) = cli.tls_key {
        config.http.tls_key = Some(key);
    }

    let store = SchemaStore::open(&config.storage.path)
        .with_context(|| format!("open database {}", config.storage.path.display()))?;
    let service = Service::with_compilers(store, config.dialects.compilers());
    tracing::info!(types = ?service.types(), "registered schema types");

    let app = transport::router(Arc::new(service));

    match config.http.tls()? {
        Some((cert, key)) => {
            let addr: SocketAddr = config
                .http
                .addr
                .parse()
                .with_context(|| format!("parse listen address {}", config.http.addr))?;
            let rustls = RustlsConfig::from_pem_file(cert, key)
                .await
                .with_context(|| format!("load TLS material {}", cert.display()))?;

            let handle = axum_server::Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(Some(TLS_SHUTDOWN_GRACE));
            });

            tracing::info!(%addr, "listening on https");
            axum_server::bind_rustls(addr, rustls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = TcpListener::bind(&config.http.addr)
                .await
                .with_context(|| format!("bind {}", config.http.addr))?;
            tracing::info!(addr = %config.http.addr, "listening on http");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}
