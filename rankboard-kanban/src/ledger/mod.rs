//! SQLite-backed position ledger
//!
//! The ledger is the only store that carries the ordering invariant: for every parent key the
//! positions of its children are exactly `0..n`. Every write that touches a position runs inside
//! one `BEGIN IMMEDIATE` transaction, so readers never observe a half-renumbered parent.
//!
//! # Schema
//!
//! - `users`, `sessions`: accounts and bearer tokens
//! - `boards`: ranked under their owner (`position`) and, when favourited, among the owner's
//!   favourites (`favourite_position`)
//! - `sections`: ranked under their board
//! - `tasks`: ranked under their section
//! - `parent_versions`: a counter per parent key, bumped on every committed position change
//! - `activity`: the operation log written by the processor
//!
//! Deleting a board cascades to its sections and their tasks through foreign keys.

mod accounts;
mod activity;
mod positions;
mod records;

pub use positions::{Assignment, PositionWrite, Snapshot};

use crate::error::Result;
use crate::types::{ChildKind, ParentKey};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Default database filename
pub const DEFAULT_DB_FILENAME: &str = "rankboard.db";

/// How long a writer waits on a locked database before SQLite reports busy
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The authoritative store for boards, sections, tasks and their ranks
///
/// `Send + Sync` through the connection mutex, so one ledger is shared by every request
/// handler behind an `Arc`.
pub struct Ledger {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").finish_non_exhaustive()
    }
}

impl Ledger {
    /// Open (or create) a ledger database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory ledger
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let ledger = Self {
            conn: Mutex::new(conn),
        };
        ledger.create_schema()?;
        Ok(ledger)
    }

    /// Lock the connection
    ///
    /// A panic while holding the lock leaves no partial write behind (the open transaction
    /// rolls back on drop), so a poisoned mutex is still safe to reuse.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS boards (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                description TEXT,
                position INTEGER NOT NULL CHECK (position >= 0),
                favourite INTEGER NOT NULL DEFAULT 0,
                favourite_position INTEGER CHECK (favourite_position >= 0),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sections (
                id TEXT PRIMARY KEY,
                board_id TEXT NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                position INTEGER NOT NULL CHECK (position >= 0),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                section_id TEXT NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                content TEXT,
                position INTEGER NOT NULL CHECK (position >= 0),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS parent_versions (
                parent_key TEXT PRIMARY KEY,
                version INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS activity (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                timestamp TEXT NOT NULL,
                op TEXT NOT NULL,
                input TEXT NOT NULL,
                output TEXT NOT NULL,
                actor TEXT,
                duration_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_boards_user ON boards(user_id, position);
            CREATE INDEX IF NOT EXISTS idx_sections_board ON sections(board_id, position);
            CREATE INDEX IF NOT EXISTS idx_tasks_section ON tasks(section_id, position);
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            "#,
        )?;
        Ok(())
    }

    /// The user that owns a parent, or `None` if the parent does not exist
    pub fn owner_of(&self, parent: &ParentKey) -> Result<Option<crate::types::UserId>> {
        let conn = self.conn();
        let owner: Option<String> = match parent {
            ParentKey::User(id) | ParentKey::Favourites(id) => conn
                .query_row("SELECT id FROM users WHERE id = ?1", [id.as_str()], |row| {
                    row.get(0)
                })
                .optional()?,
            ParentKey::Board(id) => conn
                .query_row(
                    "SELECT user_id FROM boards WHERE id = ?1",
                    [id.as_str()],
                    |row| row.get(0),
                )
                .optional()?,
            ParentKey::Section(id) => conn
                .query_row(
                    "SELECT b.user_id FROM sections s JOIN boards b ON b.id = s.board_id
                     WHERE s.id = ?1",
                    [id.as_str()],
                    |row| row.get(0),
                )
                .optional()?,
        };
        Ok(owner.map(crate::types::UserId::from_string))
    }
}

/// Where the children of one kind of parent live
#[derive(Debug, Clone, Copy)]
struct Collection {
    table: &'static str,
    parent_column: &'static str,
    position_column: &'static str,
    /// Extra predicate narrowing the table to members of the collection
    filter: &'static str,
}

impl Collection {
    fn of(kind: ChildKind) -> Self {
        match kind {
            ChildKind::Board => Self {
                table: "boards",
                parent_column: "user_id",
                position_column: "position",
                filter: "",
            },
            ChildKind::Favourite => Self {
                table: "boards",
                parent_column: "user_id",
                position_column: "favourite_position",
                filter: " AND favourite = 1",
            },
            ChildKind::Section => Self {
                table: "sections",
                parent_column: "board_id",
                position_column: "position",
                filter: "",
            },
            ChildKind::Task => Self {
                table: "tasks",
                parent_column: "section_id",
                position_column: "position",
                filter: "",
            },
        }
    }

    fn for_parent(parent: &ParentKey) -> Self {
        Self::of(parent.child_kind())
    }

    /// Table holding the parent entity itself
    fn parent_table(parent: &ParentKey) -> &'static str {
        match parent {
            ParentKey::User(_) | ParentKey::Favourites(_) => "users",
            ParentKey::Board(_) => "boards",
            ParentKey::Section(_) => "sections",
        }
    }
}

fn to_position(raw: i64) -> usize {
    usize::try_from(raw).unwrap_or_default()
}

fn from_position(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}
