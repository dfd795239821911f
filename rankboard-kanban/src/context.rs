//! KanbanContext - shared access to the ledger and engine settings
//!
//! The context provides access, not logic. Commands do all the work.

use crate::error::{KanbanError, Result};
use crate::ledger::Ledger;
use crate::types::{ParentKey, UserId};
use rankboard_operations::LogEntry;
use std::path::Path;
use std::sync::Arc;

/// Tunables the engine reads at runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanbanSettings {
    /// How many read-plan-apply cycles a move gets before a storage failure surfaces
    pub move_retry_attempts: u32,
    /// Lifetime of a freshly issued session token
    pub session_ttl: chrono::Duration,
}

impl Default for KanbanSettings {
    fn default() -> Self {
        Self {
            move_retry_attempts: 3,
            session_ttl: chrono::Duration::hours(24),
        }
    }
}

/// Context passed to every command
///
/// Cheap to clone; every clone shares the same ledger.
#[derive(Debug, Clone)]
pub struct KanbanContext {
    ledger: Arc<Ledger>,
    settings: KanbanSettings,
}

impl KanbanContext {
    /// Create a context over an existing ledger
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            settings: KanbanSettings::default(),
        }
    }

    /// Open (or create) the ledger database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Arc::new(Ledger::open(path)?)))
    }

    /// A context over a private in-memory ledger
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Arc::new(Ledger::in_memory()?)))
    }

    pub fn with_settings(mut self, settings: KanbanSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn settings(&self) -> &KanbanSettings {
        &self.settings
    }

    /// Run ledger work on the blocking thread pool
    ///
    /// SQLite calls block; async callers on hot paths go through here instead of calling
    /// [`Self::ledger`] directly.
    pub async fn with_ledger<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Ledger) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let ledger = Arc::clone(&self.ledger);
        tokio::task::spawn_blocking(move || work(&ledger))
            .await
            .map_err(|e| KanbanError::Background {
                message: format!("ledger task failed: {e}"),
            })?
    }

    // =========================================================================
    // Activity
    // =========================================================================

    /// Append an entry to the global activity log
    pub async fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        self.ledger.append_activity(entry)
    }

    /// Read activity entries, newest first
    pub async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        self.ledger.read_activity(limit)
    }

    // =========================================================================
    // Access control
    // =========================================================================

    /// Resolve a bearer token to its user
    pub async fn authenticate(&self, token: &str) -> Result<UserId> {
        match self.ledger.find_session(token)? {
            Some(session) => Ok(session.user),
            None => Err(KanbanError::Unauthorized),
        }
    }

    /// Fail with `NotFound` unless `parent` exists and belongs to `user`
    ///
    /// Someone else's parent is reported exactly like a missing one.
    pub fn ensure_owned(&self, user: &UserId, parent: &ParentKey) -> Result<()> {
        match self.ledger.owner_of(parent)? {
            Some(owner) if &owner == user => Ok(()),
            _ => Err(KanbanError::not_found(parent.resource(), parent.id())),
        }
    }
}
