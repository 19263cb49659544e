use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use reqflow_watcher::{DesignWatcher, GitPullRunner};

#[derive(Parser)]
#[command(
    name = "reqflow-watcher",
    about = "Watches a checkout for newly synced technical designs"
)]
struct Cli {
    /// Checkout directory to pull in
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Seconds between pulls
    #[arg(long, default_value_t = 10)]
    interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        repo = %cli.repo.display(),
        interval_secs = cli.interval_secs,
        "Watching for new technical designs"
    );

    let runner = Arc::new(GitPullRunner::new(cli.repo));
    let watcher = DesignWatcher::new(runner, Duration::from_secs(cli.interval_secs));
    let handle = watcher.spawn();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down watcher");
    handle.stop().await;

    Ok(())
}
