//! Delayed writes for text that changes on every keystroke
//!
//! `DelayedWriter` keeps the latest value per key and hands it to a sink once that key has been
//! quiet for the configured period. Ranks never go through here; only free text such as task
//! content does.

use crate::context::KanbanContext;
use crate::types::TaskId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Where settled values end up
#[async_trait]
pub trait WriteSink<K, V>: Send + Sync + 'static {
    async fn write(&self, key: K, value: V);
}

enum Command<K, V> {
    Write(K, V),
    Flush(oneshot::Sender<()>),
}

/// Latest-value-wins writer with a per-key quiet period
pub struct DelayedWriter<K, V> {
    tx: mpsc::UnboundedSender<Command<K, V>>,
    handle: JoinHandle<()>,
}

impl<K, V> DelayedWriter<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    /// Start the writer task
    pub fn spawn<S>(quiet: Duration, sink: S) -> Self
    where
        S: WriteSink<K, V>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(quiet, sink, rx));
        Self { tx, handle }
    }

    /// Record a new value; replaces any value for the key that has not been written yet
    pub fn write(&self, key: K, value: V) {
        if self.tx.send(Command::Write(key, value)).is_err() {
            warn!("delayed writer has stopped, dropping write");
        }
    }

    /// Write every pending value now
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(Command::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Write every pending value and stop the task
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "delayed writer task failed");
        }
    }
}

async fn run<K, V, S>(quiet: Duration, sink: S, mut rx: mpsc::UnboundedReceiver<Command<K, V>>)
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
    S: WriteSink<K, V>,
{
    let mut pending: HashMap<K, (V, Instant)> = HashMap::new();

    loop {
        let next_due = pending.values().map(|(_, due)| *due).min();

        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Write(key, value)) => {
                    pending.insert(key, (value, Instant::now() + quiet));
                }
                Some(Command::Flush(done)) => {
                    write_due(&sink, &mut pending, None).await;
                    let _ = done.send(());
                }
                None => {
                    write_due(&sink, &mut pending, None).await;
                    break;
                }
            },
            _ = tokio::time::sleep_until(next_due.unwrap_or_else(Instant::now)), if next_due.is_some() => {
                write_due(&sink, &mut pending, Some(Instant::now())).await;
            }
        }
    }
}

/// Write entries due by `now`, or everything when `now` is `None`
async fn write_due<K, V, S>(sink: &S, pending: &mut HashMap<K, (V, Instant)>, now: Option<Instant>)
where
    K: Eq + Hash + Clone,
    S: WriteSink<K, V>,
{
    let due: Vec<K> = pending
        .iter()
        .filter(|(_, (_, at))| now.is_none_or(|now| *at <= now))
        .map(|(key, _)| key.clone())
        .collect();

    for key in due {
        if let Some((value, _)) = pending.remove(&key) {
            sink.write(key, value).await;
        }
    }
}

/// Sink that stores task content through the ledger
#[derive(Debug, Clone)]
pub struct TaskContentSink {
    ctx: KanbanContext,
}

impl TaskContentSink {
    pub fn new(ctx: KanbanContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl WriteSink<TaskId, String> for TaskContentSink {
    async fn write(&self, key: TaskId, value: String) {
        match self.ctx.ledger().update_task(&key, None, Some(value.as_str())) {
            Ok(_) => debug!(task = %key, "saved task content"),
            Err(e) => warn!(task = %key, error = %e, "failed to save task content"),
        }
    }
}
