//! process-scout - version 0.1.0
//!
//! Per-process CPU and memory exporter with tracing logging.
//! This is the main entry point that loads configuration and runs the HTTP server.

use clap::Parser;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

use process_scout::cli::Args;
use process_scout::config::{load_config, Config};
use process_scout::handlers;
use process_scout::process::ProcFs;
use process_scout::state::AppState;

/// Initializes tracing logging subsystem with configured log level.
fn setup_logging(args: &Args) {
    let Some(log_level) = args.log_level.to_level() else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", args.log_level);
}

/// Loads the configuration or terminates the process with exit code 1.
fn load_config_or_exit(args: &Args) -> Config {
    match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ Configuration invalid: {}", e);
            std::process::exit(1);
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(&args);

    let config = load_config_or_exit(&args);

    if args.check_config {
        println!("✅ Configuration is valid");
        return Ok(());
    }

    info!("Starting process-scout");

    let bind_addr = config.bind_address();
    let state = Arc::new(AppState::new(config, ProcFs::default())?);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_addr, e);
            return Err(e.into());
        }
    };
    info!("Exporter running on http://{}/metrics", bind_addr);

    let app = handlers::router(state);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("process-scout stopped gracefully");
    Ok(())
}
