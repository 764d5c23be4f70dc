//! kvdash -- operations console core for a sharded KV cluster.
//!
//! Polls the cluster control endpoint at a fixed interval, normalizes
//! node statuses, recomputes cluster-wide stats on every snapshot and
//! logs them.  `--once` takes a single snapshot and prints the stats as
//! JSON for scripting.

use std::time::Duration;

use clap::Parser;
use tracing::info;

/// Command-line arguments for the kvdash poller.
#[derive(Parser, Debug)]
#[command(
    name = "kvdash",
    version,
    about = "Dashboard poller for a sharded, replicated KV cluster"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "kvdash.example.yaml")]
    config: String,

    /// Override the control endpoint base URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Fetch one snapshot, print stats as JSON, and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing / logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!("Loading configuration from {}", cli.config);
    let mut config = kvdash::config::load_config(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.controller.base_url = base_url;
    }

    kvdash::metrics::describe_metrics();

    let client = kvdash::admin::AdminClient::from_config(&config)?;

    if cli.once {
        let cluster = client.fetch_cluster().await?;
        let stats = kvdash::stats::aggregate(&cluster);
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let interval = Duration::from_secs(config.poll.interval_seconds);
    info!(
        "Polling {} every {}s",
        client.base_url(),
        config.poll.interval_seconds
    );

    let (poller, handle) = kvdash::poller::Poller::new(client, interval);

    // The loop runs until SIGTERM/SIGINT; an in-flight fetch is simply
    // abandoned, leaving the last published snapshot intact.
    tokio::select! {
        _ = poller.run() => {}
        _ = shutdown_signal() => {}
    }

    let snapshot = handle.snapshot();
    info!(
        state = ?snapshot.state,
        total_nodes = snapshot.stats.total_nodes,
        "kvdash shut down"
    );

    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
