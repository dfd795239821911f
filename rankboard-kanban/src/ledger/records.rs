//! Boards, sections and tasks: creation at the trailing rank, deletion with renumbering,
//! field updates and ordered reads

use super::positions::{bump_version, child_count, close_gap, ensure_parent, forget_version};
use super::{from_position, to_position, Ledger};
use crate::error::{KanbanError, Result};
use crate::types::{
    Board, BoardDetail, BoardId, ParentKey, Section, SectionId, SectionWithTasks, Task, TaskId,
    UserId,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

const BOARD_COLUMNS: &str =
    "id, user_id, title, description, position, favourite, favourite_position, created_at, updated_at";
const SECTION_COLUMNS: &str = "id, board_id, title, position, created_at, updated_at";
const TASK_COLUMNS: &str = "id, section_id, title, content, position, created_at, updated_at";

fn board_from_row(row: &Row<'_>) -> rusqlite::Result<Board> {
    Ok(Board {
        id: BoardId::from_string(row.get::<_, String>(0)?),
        user: UserId::from_string(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        position: to_position(row.get(4)?),
        favourite: row.get(5)?,
        favourite_position: row.get::<_, Option<i64>>(6)?.map(to_position),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn section_from_row(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        id: SectionId::from_string(row.get::<_, String>(0)?),
        board: BoardId::from_string(row.get::<_, String>(1)?),
        title: row.get(2)?,
        position: to_position(row.get(3)?),
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: TaskId::from_string(row.get::<_, String>(0)?),
        section: SectionId::from_string(row.get::<_, String>(1)?),
        title: row.get(2)?,
        content: row.get(3)?,
        position: to_position(row.get(4)?),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn load_board(conn: &Connection, id: &BoardId) -> Result<Board> {
    conn.query_row(
        &format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?1"),
        [id.as_str()],
        board_from_row,
    )
    .optional()?
    .ok_or_else(|| KanbanError::not_found("board", id.as_str()))
}

fn load_section(conn: &Connection, id: &SectionId) -> Result<Section> {
    conn.query_row(
        &format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = ?1"),
        [id.as_str()],
        section_from_row,
    )
    .optional()?
    .ok_or_else(|| KanbanError::not_found("section", id.as_str()))
}

fn load_task(conn: &Connection, id: &TaskId) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [id.as_str()],
        task_from_row,
    )
    .optional()?
    .ok_or_else(|| KanbanError::not_found("task", id.as_str()))
}

fn query_sections(conn: &Connection, board: &BoardId) -> Result<Vec<Section>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SECTION_COLUMNS} FROM sections WHERE board_id = ?1 ORDER BY position"
    ))?;
    let sections = stmt
        .query_map([board.as_str()], section_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(sections)
}

fn query_tasks(conn: &Connection, section: &SectionId) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE section_id = ?1 ORDER BY position"
    ))?;
    let tasks = stmt
        .query_map([section.as_str()], task_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

impl Ledger {
    /// Load the records behind ordered id lists, keeping each list's order, in one transaction
    ///
    /// Ids deleted since the lists were committed are skipped.
    fn load_ordered<T>(
        &self,
        lists: &[&[String]],
        load: impl Fn(&Connection, &str) -> Result<T>,
    ) -> Result<Vec<Vec<T>>> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let mut loaded = Vec::with_capacity(lists.len());
        for ids in lists {
            let mut records = Vec::with_capacity(ids.len());
            for id in ids.iter() {
                match load(&*tx, id.as_str()) {
                    Ok(record) => records.push(record),
                    Err(KanbanError::NotFound { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            loaded.push(records);
        }
        tx.commit()?;
        Ok(loaded)
    }

    /// Boards for a committed ordering of board ids
    pub fn boards_in_order(&self, ids: &[String]) -> Result<Vec<Board>> {
        let mut lists =
            self.load_ordered(&[ids], |conn, id| load_board(conn, &BoardId::from_string(id)))?;
        Ok(lists.pop().unwrap_or_default())
    }

    /// Sections for a committed ordering of section ids
    pub fn sections_in_order(&self, ids: &[String]) -> Result<Vec<Section>> {
        let mut lists = self.load_ordered(&[ids], |conn, id| {
            load_section(conn, &SectionId::from_string(id))
        })?;
        Ok(lists.pop().unwrap_or_default())
    }

    /// Tasks for the committed source and destination orderings of a move
    pub fn tasks_in_order(
        &self,
        source: &[String],
        destination: &[String],
    ) -> Result<(Vec<Task>, Vec<Task>)> {
        let mut lists = self
            .load_ordered(&[source, destination], |conn, id| {
                load_task(conn, &TaskId::from_string(id))
            })?
            .into_iter();
        let source = lists.next().unwrap_or_default();
        let destination = lists.next().unwrap_or_default();
        Ok((source, destination))
    }

    // =========================================================================
    // Boards
    // =========================================================================

    /// Create a board at the end of its owner's list
    pub fn create_board(
        &self,
        user: &UserId,
        title: &str,
        description: Option<&str>,
    ) -> Result<Board> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let parent = ParentKey::User(user.clone());
        ensure_parent(&tx, &parent)?;
        let position = child_count(&tx, &parent)?;
        let now = Utc::now();
        let board = Board {
            id: BoardId::new(),
            user: user.clone(),
            title: title.to_string(),
            description: description.map(str::to_string),
            position,
            favourite: false,
            favourite_position: None,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            "INSERT INTO boards (id, user_id, title, description, position, favourite,
                                 favourite_position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL, ?6, ?7)",
            params![
                board.id.as_str(),
                user.as_str(),
                board.title,
                board.description,
                from_position(position),
                now,
                now
            ],
        )?;
        bump_version(&tx, &parent)?;
        tx.commit()?;
        Ok(board)
    }

    pub fn get_board(&self, id: &BoardId) -> Result<Board> {
        load_board(&self.conn(), id)
    }

    /// A user's boards in position order
    pub fn list_boards(&self, user: &UserId) -> Result<Vec<Board>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE user_id = ?1 ORDER BY position"
        ))?;
        let boards = stmt
            .query_map([user.as_str()], board_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(boards)
    }

    /// A user's favourite boards in favourite order
    pub fn list_favourites(&self, user: &UserId) -> Result<Vec<Board>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards WHERE user_id = ?1 AND favourite = 1
             ORDER BY favourite_position"
        ))?;
        let boards = stmt
            .query_map([user.as_str()], board_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(boards)
    }

    /// A board with its sections and their tasks, all ordered, read in one transaction
    pub fn board_detail(&self, id: &BoardId) -> Result<BoardDetail> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let board = load_board(&tx, id)?;
        let mut sections = Vec::new();
        for section in query_sections(&tx, id)? {
            let tasks = query_tasks(&tx, &section.id)?;
            sections.push(SectionWithTasks { section, tasks });
        }
        tx.commit()?;
        Ok(BoardDetail { board, sections })
    }

    /// Change a board's title and description
    ///
    /// `None` leaves a field as it is; `Some("")` clears the description.
    pub fn update_board(
        &self,
        id: &BoardId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Board> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut board = load_board(&tx, id)?;
        if let Some(title) = title {
            board.title = title.to_string();
        }
        if let Some(description) = description {
            board.description = (!description.is_empty()).then(|| description.to_string());
        }
        board.updated_at = Utc::now();
        tx.execute(
            "UPDATE boards SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            params![board.title, board.description, board.updated_at, id.as_str()],
        )?;
        tx.commit()?;
        Ok(board)
    }

    /// Add a board to, or remove it from, its owner's favourites
    ///
    /// Marking appends at the trailing favourite rank; unmarking closes the gap. Setting the
    /// flag to its current value changes nothing.
    pub fn set_favourite(&self, id: &BoardId, favourite: bool) -> Result<Board> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut board = load_board(&tx, id)?;
        if board.favourite == favourite {
            return Ok(board);
        }

        let parent = ParentKey::Favourites(board.user.clone());
        let now = Utc::now();
        if favourite {
            let position = child_count(&tx, &parent)?;
            tx.execute(
                "UPDATE boards SET favourite = 1, favourite_position = ?1, updated_at = ?2
                 WHERE id = ?3",
                params![from_position(position), now, id.as_str()],
            )?;
            board.favourite_position = Some(position);
        } else {
            tx.execute(
                "UPDATE boards SET favourite = 0, favourite_position = NULL, updated_at = ?1
                 WHERE id = ?2",
                params![now, id.as_str()],
            )?;
            if let Some(removed) = board.favourite_position {
                close_gap(&tx, &parent, removed)?;
            }
            board.favourite_position = None;
        }
        bump_version(&tx, &parent)?;
        tx.commit()?;

        board.favourite = favourite;
        board.updated_at = now;
        Ok(board)
    }

    /// Delete a board, its sections and their tasks, closing the gaps it leaves
    pub fn delete_board(&self, id: &BoardId) -> Result<Board> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let board = load_board(&tx, id)?;
        let sections = query_sections(&tx, id)?;

        tx.execute("DELETE FROM boards WHERE id = ?1", [id.as_str()])?;

        let owner = ParentKey::User(board.user.clone());
        close_gap(&tx, &owner, board.position)?;
        bump_version(&tx, &owner)?;
        if let Some(removed) = board.favourite_position {
            let favourites = ParentKey::Favourites(board.user.clone());
            close_gap(&tx, &favourites, removed)?;
            bump_version(&tx, &favourites)?;
        }

        forget_version(&tx, &ParentKey::Board(id.clone()))?;
        for section in sections {
            forget_version(&tx, &ParentKey::Section(section.id))?;
        }
        tx.commit()?;
        Ok(board)
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// Create a section at the end of its board
    pub fn create_section(&self, board: &BoardId, title: &str) -> Result<Section> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let parent = ParentKey::Board(board.clone());
        ensure_parent(&tx, &parent)?;
        let position = child_count(&tx, &parent)?;
        let now = Utc::now();
        let section = Section {
            id: SectionId::new(),
            board: board.clone(),
            title: title.to_string(),
            position,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            "INSERT INTO sections (id, board_id, title, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                section.id.as_str(),
                board.as_str(),
                section.title,
                from_position(position),
                now,
                now
            ],
        )?;
        bump_version(&tx, &parent)?;
        tx.commit()?;
        Ok(section)
    }

    pub fn get_section(&self, id: &SectionId) -> Result<Section> {
        load_section(&self.conn(), id)
    }

    /// A board's sections in position order
    pub fn list_sections(&self, board: &BoardId) -> Result<Vec<Section>> {
        let conn = self.conn();
        ensure_parent(&conn, &ParentKey::Board(board.clone()))?;
        query_sections(&conn, board)
    }

    pub fn update_section(&self, id: &SectionId, title: &str) -> Result<Section> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut section = load_section(&tx, id)?;
        section.title = title.to_string();
        section.updated_at = Utc::now();
        tx.execute(
            "UPDATE sections SET title = ?1, updated_at = ?2 WHERE id = ?3",
            params![section.title, section.updated_at, id.as_str()],
        )?;
        tx.commit()?;
        Ok(section)
    }

    /// Delete a section and its tasks, shifting later sections down
    pub fn delete_section(&self, id: &SectionId) -> Result<Section> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let section = load_section(&tx, id)?;

        tx.execute("DELETE FROM sections WHERE id = ?1", [id.as_str()])?;
        let parent = ParentKey::Board(section.board.clone());
        close_gap(&tx, &parent, section.position)?;
        bump_version(&tx, &parent)?;
        forget_version(&tx, &ParentKey::Section(id.clone()))?;
        tx.commit()?;
        Ok(section)
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Create a task at the end of its section
    pub fn create_task(
        &self,
        section: &SectionId,
        title: &str,
        content: Option<&str>,
    ) -> Result<Task> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let parent = ParentKey::Section(section.clone());
        ensure_parent(&tx, &parent)?;
        let position = child_count(&tx, &parent)?;
        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            section: section.clone(),
            title: title.to_string(),
            content: content.map(str::to_string),
            position,
            created_at: now,
            updated_at: now,
        };
        tx.execute(
            "INSERT INTO tasks (id, section_id, title, content, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                task.id.as_str(),
                section.as_str(),
                task.title,
                task.content,
                from_position(position),
                now,
                now
            ],
        )?;
        bump_version(&tx, &parent)?;
        tx.commit()?;
        Ok(task)
    }

    pub fn get_task(&self, id: &TaskId) -> Result<Task> {
        load_task(&self.conn(), id)
    }

    /// A section's tasks in position order
    pub fn list_tasks(&self, section: &SectionId) -> Result<Vec<Task>> {
        let conn = self.conn();
        ensure_parent(&conn, &ParentKey::Section(section.clone()))?;
        query_tasks(&conn, section)
    }

    /// Change a task's title and content; `None` leaves a field untouched
    pub fn update_task(
        &self,
        id: &TaskId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Task> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut task = load_task(&tx, id)?;
        if let Some(title) = title {
            task.title = title.to_string();
        }
        if let Some(content) = content {
            task.content = Some(content.to_string());
        }
        task.updated_at = Utc::now();
        tx.execute(
            "UPDATE tasks SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
            params![task.title, task.content, task.updated_at, id.as_str()],
        )?;
        tx.commit()?;
        Ok(task)
    }

    /// Delete a task, shifting later siblings down
    pub fn delete_task(&self, id: &TaskId) -> Result<Task> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let task = load_task(&tx, id)?;

        tx.execute("DELETE FROM tasks WHERE id = ?1", [id.as_str()])?;
        let parent = ParentKey::Section(task.section.clone());
        close_gap(&tx, &parent, task.position)?;
        bump_version(&tx, &parent)?;
        tx.commit()?;
        Ok(task)
    }
}
