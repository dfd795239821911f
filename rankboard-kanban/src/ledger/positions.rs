//! Snapshots, atomic position writes and the helpers every ranked mutation shares

use super::{from_position, to_position, Collection, Ledger};
use crate::error::{KanbanError, Result};
use crate::types::ParentKey;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The ordered children of one parent, read from one consistent snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub parent: ParentKey,
    /// Version stamp of the parent when the snapshot was taken
    pub version: u64,
    /// Child ids in ascending position order
    pub children: Vec<String>,
}

/// Place one child at a rank under a parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub parent: ParentKey,
    pub position: usize,
}

/// A batch of assignments guarded by the parent versions they were planned against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionWrite {
    /// Every parent the write touches, with the version it was read at
    pub expected: Vec<(ParentKey, u64)>,
    pub assignments: Vec<Assignment>,
}

impl PositionWrite {
    /// Start a write planned against the given snapshot
    pub fn against(snapshot: &Snapshot) -> Self {
        Self {
            expected: vec![(snapshot.parent.clone(), snapshot.version)],
            assignments: Vec::new(),
        }
    }

    /// Also guard on another snapshot
    pub fn and_against(mut self, snapshot: &Snapshot) -> Self {
        if !self.expected.iter().any(|(p, _)| p == &snapshot.parent) {
            self.expected
                .push((snapshot.parent.clone(), snapshot.version));
        }
        self
    }

    /// Assign every id of `ordered` its index under `parent`
    pub fn rank<I, S>(mut self, parent: &ParentKey, ordered: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignments
            .extend(
                ordered
                    .into_iter()
                    .enumerate()
                    .map(|(position, id)| Assignment {
                        id: id.into(),
                        parent: parent.clone(),
                        position,
                    }),
            );
        self
    }
}

impl Ledger {
    /// List the ordered children of a parent
    ///
    /// Fails with `NotFound` if the parent itself does not exist.
    pub fn snapshot(&self, parent: &ParentKey) -> Result<Snapshot> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

        ensure_parent(&tx, parent)?;
        let snapshot = Snapshot {
            parent: parent.clone(),
            version: version_of(&tx, parent)?,
            children: child_ids(&tx, parent)?,
        };
        tx.commit()?;

        debug!(
            parent = %parent,
            version = snapshot.version,
            children = snapshot.children.len(),
            "read snapshot"
        );
        Ok(snapshot)
    }

    /// Apply a batch of position assignments atomically
    ///
    /// All or nothing: the batch is rejected if any guarded parent changed since it was read
    /// (`VersionMismatch`), if an assigned id is not a member of its collection
    /// (`StaleSource`), or if any touched parent would be left with non-dense positions
    /// (`OrderViolation`). A parent deleted since it was read fails with `NotFound`.
    pub fn apply_positions(&self, write: &PositionWrite) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut touched: BTreeMap<String, &ParentKey> = BTreeMap::new();
        for (parent, _) in &write.expected {
            touched.insert(parent.storage_key(), parent);
        }
        for assignment in &write.assignments {
            touched.insert(assignment.parent.storage_key(), &assignment.parent);
        }
        // Deleted parents lose their version row and would read as never changed
        for parent in touched.values() {
            ensure_parent(&tx, parent)?;
        }

        for (parent, expected) in &write.expected {
            let current = version_of(&tx, parent)?;
            if current != *expected {
                debug!(parent = %parent, expected, current, "parent version moved on");
                return Err(KanbanError::VersionMismatch {
                    parent: parent.to_string(),
                });
            }
        }

        let now = Utc::now();
        for assignment in &write.assignments {
            let c = Collection::for_parent(&assignment.parent);
            let sql = format!(
                "UPDATE {table} SET {parent_col} = ?1, {pos_col} = ?2, updated_at = ?3
                 WHERE id = ?4{filter}",
                table = c.table,
                parent_col = c.parent_column,
                pos_col = c.position_column,
                filter = c.filter,
            );
            let updated = tx.execute(
                &sql,
                params![
                    assignment.parent.id(),
                    from_position(assignment.position),
                    now,
                    assignment.id
                ],
            )?;
            if updated == 0 {
                return Err(KanbanError::StaleSource {
                    id: assignment.id.clone(),
                    parent: assignment.parent.to_string(),
                });
            }
        }

        for parent in touched.values() {
            verify_dense(&tx, parent)?;
            bump_version(&tx, parent)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Current version stamp of a parent (0 if it never changed)
    pub fn version(&self, parent: &ParentKey) -> Result<u64> {
        version_of(&self.conn(), parent)
    }

    /// Check that a parent's children are ranked `0..n`
    pub fn check_dense(&self, parent: &ParentKey) -> Result<()> {
        verify_dense(&self.conn(), parent)
    }
}

/// Fail with `NotFound` unless the parent entity exists
pub(super) fn ensure_parent(conn: &Connection, parent: &ParentKey) -> Result<()> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE id = ?1",
        Collection::parent_table(parent)
    );
    let found: Option<i64> = conn
        .query_row(&sql, [parent.id()], |row| row.get(0))
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(KanbanError::not_found(parent.resource(), parent.id())),
    }
}

pub(super) fn version_of(conn: &Connection, parent: &ParentKey) -> Result<u64> {
    let version: Option<i64> = conn
        .query_row(
            "SELECT version FROM parent_versions WHERE parent_key = ?1",
            [parent.storage_key()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(version.map(|v| v as u64).unwrap_or(0))
}

pub(super) fn bump_version(conn: &Connection, parent: &ParentKey) -> Result<()> {
    conn.execute(
        "INSERT INTO parent_versions (parent_key, version) VALUES (?1, 1)
         ON CONFLICT(parent_key) DO UPDATE SET version = version + 1",
        [parent.storage_key()],
    )?;
    Ok(())
}

pub(super) fn forget_version(conn: &Connection, parent: &ParentKey) -> Result<()> {
    conn.execute(
        "DELETE FROM parent_versions WHERE parent_key = ?1",
        [parent.storage_key()],
    )?;
    Ok(())
}

pub(super) fn child_ids(conn: &Connection, parent: &ParentKey) -> Result<Vec<String>> {
    let c = Collection::for_parent(parent);
    let sql = format!(
        "SELECT id FROM {table} WHERE {parent_col} = ?1{filter} ORDER BY {pos_col}",
        table = c.table,
        parent_col = c.parent_column,
        pos_col = c.position_column,
        filter = c.filter,
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map([parent.id()], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

/// The trailing position a new child of `parent` takes
pub(super) fn child_count(conn: &Connection, parent: &ParentKey) -> Result<usize> {
    let c = Collection::for_parent(parent);
    let sql = format!(
        "SELECT COUNT(*) FROM {table} WHERE {parent_col} = ?1{filter}",
        table = c.table,
        parent_col = c.parent_column,
        filter = c.filter,
    );
    let count: i64 = conn.query_row(&sql, [parent.id()], |row| row.get(0))?;
    Ok(to_position(count))
}

/// Shift every sibling ranked after `removed` down by one
pub(super) fn close_gap(conn: &Connection, parent: &ParentKey, removed: usize) -> Result<()> {
    let c = Collection::for_parent(parent);
    let sql = format!(
        "UPDATE {table} SET {pos_col} = {pos_col} - 1
         WHERE {parent_col} = ?1{filter} AND {pos_col} > ?2",
        table = c.table,
        parent_col = c.parent_column,
        pos_col = c.position_column,
        filter = c.filter,
    );
    conn.execute(&sql, params![parent.id(), from_position(removed)])?;
    Ok(())
}

pub(super) fn verify_dense(conn: &Connection, parent: &ParentKey) -> Result<()> {
    let c = Collection::for_parent(parent);
    let sql = format!(
        "SELECT {pos_col} FROM {table} WHERE {parent_col} = ?1{filter} ORDER BY {pos_col}",
        table = c.table,
        parent_col = c.parent_column,
        pos_col = c.position_column,
        filter = c.filter,
    );
    let mut stmt = conn.prepare(&sql)?;
    let positions = stmt
        .query_map([parent.id()], |row| row.get::<_, Option<i64>>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let dense = positions
        .iter()
        .enumerate()
        .all(|(rank, position)| *position == Some(from_position(rank)));
    if dense {
        Ok(())
    } else {
        Err(KanbanError::OrderViolation {
            parent: parent.to_string(),
        })
    }
}
