use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("git pull failed: {0}")]
    Pull(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of classifying a pull's stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// Nothing new was fetched
    UpToDate,
    /// New content arrived; carries the pull summary
    NewContent(String),
}

/// Classify `git pull` stdout. Both spellings git has used for the
/// no-op case are treated as up to date.
pub fn classify_pull_output(stdout: &str) -> PullOutcome {
    if stdout.contains("Already up to date") || stdout.contains("Already up-to-date") {
        return PullOutcome::UpToDate;
    }
    PullOutcome::NewContent(stdout.trim().to_string())
}

/// One pull against the watched checkout.
#[async_trait]
pub trait PullRunner: Send + Sync {
    async fn pull(&self) -> Result<String, WatcherError>;
}

/// `PullRunner` that shells out to `git pull` in the checkout directory.
pub struct GitPullRunner {
    repo_path: PathBuf,
}

impl GitPullRunner {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }
}

#[async_trait]
impl PullRunner for GitPullRunner {
    async fn pull(&self) -> Result<String, WatcherError> {
        let output = tokio::process::Command::new("git")
            .arg("pull")
            .current_dir(&self.repo_path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WatcherError::Pull(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Periodic design-sync poller with an injectable interval.
///
/// A failed pull ends that cycle only; the next tick runs normally.
pub struct DesignWatcher {
    runner: Arc<dyn PullRunner>,
    interval: Duration,
}

impl DesignWatcher {
    pub fn new(runner: Arc<dyn PullRunner>, interval: Duration) -> Self {
        Self { runner, interval }
    }

    /// Run a single pull cycle. Returns the pull summary when new content
    /// arrived, `None` otherwise (up to date or failed).
    pub async fn run_once(&self) -> Option<String> {
        let stdout = match self.runner.pull().await {
            Ok(stdout) => stdout,
            Err(err) => {
                tracing::error!(error = %err, "Design pull failed");
                return None;
            }
        };

        match classify_pull_output(&stdout) {
            PullOutcome::UpToDate => None,
            PullOutcome::NewContent(summary) => {
                tracing::info!(summary = %summary, "New design content synced");
                Some(summary)
            }
        }
    }

    /// Start polling. The first cycle runs immediately, then one per
    /// interval until the returned handle is stopped.
    pub fn spawn(self) -> WatcherHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        WatcherHandle {
            stop: stop_tx,
            join,
        }
    }
}

/// Handle to a running watcher. Dropping it without calling `stop`
/// also terminates the loop (the stop channel closes).
pub struct WatcherHandle {
    stop: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stop the poller and wait for the loop to exit.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.join.await;
    }
}
