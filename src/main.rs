use std::sync::Arc;

use anyhow::{Context, Result};
use product_catalog::{Catalog, build_router, cli::Cli, config::AppConfig, state::AppState};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    let config = cli.apply(
        AppConfig::from_env().context("failed to load application configuration")?,
    );

    let store = config.file_store();
    info!(path = %store.path().display(), write_mode = ?store.write_mode(), "opening catalog");

    let catalog = match Catalog::open(Arc::new(store)) {
        Ok(catalog) => catalog,
        Err(err) => {
            error!(error = %err, "failed to open catalog");
            return Err(err).context("failed to open catalog");
        }
    };

    let app = build_router(AppState::new(Arc::new(catalog)));

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        address = %addr,
        data_file = %config.data_path.display(),
        write_mode = ?config.write_mode,
        "catalog server listening, press Ctrl+C to exit"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "product_catalog=debug,tower_http=info";

/// Logs to stderr so stdout stays free; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    info!(signal, "draining in-flight requests before exit");
}
