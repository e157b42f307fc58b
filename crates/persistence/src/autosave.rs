//! Debounced auto-save.
//!
//! Every edit hands the saver a fresh snapshot. The saver waits for a quiet
//! period after the last snapshot and writes only the newest one, so a burst
//! of edits produces a single save.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::project_store::{Persistence, ProjectSnapshot};

/// Background task that saves the latest snapshot after `debounce` of quiet.
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<ProjectSnapshot>,
    saves: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Spawn the saver on the current tokio runtime.
    pub fn spawn(persistence: Arc<Persistence>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let saves = Arc::new(AtomicU64::new(0));
        let task = tokio::spawn(run(persistence, rx, debounce, saves.clone()));
        Self { tx, saves, task }
    }

    /// Record a change. Replaces any snapshot still waiting to be saved.
    pub fn notify(&self, snapshot: ProjectSnapshot) {
        if self.tx.send(snapshot).is_err() {
            tracing::warn!("Auto-save task is gone; change not scheduled");
        }
    }

    /// Number of completed save attempts.
    pub fn saves(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    /// Flush any pending snapshot and stop the task.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Auto-save task join failed");
        }
    }
}

async fn run(
    persistence: Arc<Persistence>,
    mut rx: mpsc::UnboundedReceiver<ProjectSnapshot>,
    debounce: Duration,
    saves: Arc<AtomicU64>,
) {
    while let Some(mut latest) = rx.recv().await {
        let mut open = true;
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(snapshot) => latest = snapshot,
                    None => {
                        open = false;
                        break;
                    }
                },
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        save(&persistence, latest).await;
        saves.fetch_add(1, Ordering::Relaxed);
        if !open {
            break;
        }
    }
    tracing::debug!("Auto-save task finished");
}

async fn save(persistence: &Arc<Persistence>, snapshot: ProjectSnapshot) {
    let persistence = persistence.clone();
    let result = tokio::task::spawn_blocking(move || persistence.save(&snapshot)).await;
    match result {
        Ok(Ok(_)) => tracing::debug!("Auto-saved project"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Auto-save failed"),
        Err(e) => tracing::warn!(error = %e, "Auto-save task panicked"),
    }
}
