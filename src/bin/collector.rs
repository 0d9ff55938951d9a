//! cloudpulse Collector Binary
//!
//! Runs the scheduled metric collection loop and serves the on-demand
//! HTTP API from the same process.

use cloudpulse::api::{self, ApiState};
use cloudpulse::clock::BoundedClock;
use cloudpulse::config::{ComponentFactory, PROJECT_SCOPE_PLACEHOLDER};
use cloudpulse::persist::Persister;
use cloudpulse::pipeline::Pipeline;
use cloudpulse::query::QueryBuilder;

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// cloudpulse Collector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// HTTP API port
    #[arg(long, default_value = "8080")]
    http_port: u16,

    /// Project whose compute instances are scraped
    #[arg(long, env = "GCLOUD_PROJECT", default_value = PROJECT_SCOPE_PLACEHOLDER)]
    project_id: String,

    /// Seconds between scheduled collection cycles
    #[arg(long, env = "SCRAPE_INTERVAL_SECS", default_value = "600")]
    scrape_interval_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .json()
        .init();

    info!("Starting cloudpulse Collector");

    // Construct process-wide handles once; everything downstream gets them
    // injected.
    let store = ComponentFactory::create_document_store().await?;
    let client = ComponentFactory::create_metrics_client()?;
    let clock = Arc::new(BoundedClock::default());
    let query_builder = QueryBuilder::new(args.project_id.clone(), clock);

    let pipeline = Arc::new(Pipeline::new(
        client.clone(),
        Persister::new(store),
        query_builder.clone(),
    ));

    // Start scheduled collection
    let shutdown = CancellationToken::new();
    let scheduler_shutdown = shutdown.clone();
    let scheduler_pipeline = pipeline.clone();
    let interval = Duration::from_secs(args.scrape_interval_secs);
    let scheduler = tokio::spawn(async move {
        scheduler_pipeline.run(interval, scheduler_shutdown).await;
    });

    // Build HTTP router
    let router = api::build_http_router(ApiState {
        client,
        query_builder,
    });

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], args.http_port));
    let listener = TcpListener::bind(addr).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.cancel();
        let _ = shutdown_tx.send(true);
    });

    info!(
        http_port = args.http_port,
        project_id = %args.project_id,
        scrape_interval_secs = args.scrape_interval_secs,
        "Collector ready"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .await?;

    let _ = scheduler.await;
    info!("Collector shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
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

async fn wait_for_shutdown(mut shutdown: watch::Receiver<bool>) {
    if *shutdown.borrow() {
        return;
    }
    let _ = shutdown.changed().await;
}
