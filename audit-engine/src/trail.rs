// Fire-and-forget history recording
use std::sync::Arc;

use database_layer::{HistoryEntry, HistoryStore, TableRegistry};
use logger_redacted::redact_email;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::entry::PendingEntry;
use crate::error::{AuditError, Result};

enum Command {
    Record(PendingEntry),
    Flush(oneshot::Sender<()>),
}

/// Resolves the table and appends one entry. No queueing, errors are returned.
pub struct HistoryRecorder {
    table_name: String,
    tables: Arc<dyn TableRegistry>,
    history: Arc<dyn HistoryStore>,
}

impl HistoryRecorder {
    pub fn new(
        table_name: impl Into<String>,
        tables: Arc<dyn TableRegistry>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            tables,
            history,
        }
    }

    /// Write `entry` now.
    ///
    /// The table is looked up on every call.
    ///
    /// # Errors
    ///
    /// Fails when the table is not registered or either store errors.
    pub async fn write(&self, entry: PendingEntry) -> Result<HistoryEntry> {
        let table = self
            .tables
            .find_by_name(&self.table_name)
            .await?
            .ok_or_else(|| AuditError::TableNotFound(self.table_name.clone()))?;

        let stored = self.history.append(entry.into_history(table.id)).await?;
        debug!(
            history_id = %stored.id,
            analyzer_id = %stored.analyzer_id,
            action = %stored.action,
            "History entry stored"
        );
        Ok(stored)
    }

    async fn run(self, mut receiver: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = receiver.recv().await {
            match command {
                Command::Record(entry) => {
                    let analyzer_id = entry.analyzer_id;
                    let action = entry.action;
                    let user = redact_email(&entry.user_email);

                    if let Err(e) = self.write(entry).await {
                        error!(
                            target: "audit",
                            analyzer_id = %analyzer_id,
                            action = %action,
                            user = %user,
                            error = %e,
                            "Failed to store history entry; entry dropped"
                        );
                    }
                }
                Command::Flush(done) => {
                    // Receiver may have given up waiting
                    let _ = done.send(());
                }
            }
        }

        info!(target: "audit", "History worker stopped");
    }
}

/// Handle used by request paths to queue history entries.
///
/// Cloning is cheap; all clones feed the same worker.
#[derive(Clone)]
pub struct AuditTrail {
    sender: mpsc::UnboundedSender<Command>,
}

/// Background task draining the queue
pub struct AuditWorker {
    handle: JoinHandle<()>,
}

impl AuditTrail {
    /// Start the worker on the current tokio runtime
    pub fn spawn(
        table_name: impl Into<String>,
        tables: Arc<dyn TableRegistry>,
        history: Arc<dyn HistoryStore>,
    ) -> (Self, AuditWorker) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let recorder = HistoryRecorder::new(table_name, tables, history);
        let handle = tokio::spawn(recorder.run(receiver));

        (Self { sender }, AuditWorker { handle })
    }

    /// Queue an entry. Never blocks and never fails the caller.
    pub fn record(&self, entry: PendingEntry) {
        let analyzer_id = entry.analyzer_id;
        if self.sender.send(Command::Record(entry)).is_err() {
            warn!(
                target: "audit",
                analyzer_id = %analyzer_id,
                "History worker is gone; entry dropped"
            );
        }
    }

    /// Wait until every entry queued before this call has been handled.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::QueueClosed`] if the worker has stopped.
    pub async fn flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.sender
            .send(Command::Flush(done))
            .map_err(|_| AuditError::QueueClosed)?;
        wait.await.map_err(|_| AuditError::QueueClosed)
    }
}

impl AuditWorker {
    /// Wait for the queue to drain. Returns once every [`AuditTrail`] clone is dropped.
    pub async fn shutdown(self) {
        if let Err(e) = self.handle.await {
            error!(target: "audit", error = %e, "History worker panicked");
        }
    }
}
