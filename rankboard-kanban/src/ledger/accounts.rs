//! Users and session tokens

use super::Ledger;
use crate::error::{KanbanError, Result};
use crate::types::{Session, User, UserId};
use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension, Row};

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId::from_string(row.get::<_, String>(0)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Ledger {
    /// Register a user; usernames are unique
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let conn = self.conn();
        let taken: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(KanbanError::duplicate_id("username", username));
        }

        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO users (id, username, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id.as_str(),
                user.username,
                user.password_hash,
                user.created_at
            ],
        )?;
        Ok(user)
    }

    pub fn get_user(&self, id: &UserId) -> Result<User> {
        self.conn()
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                [id.as_str()],
                user_from_row,
            )
            .optional()?
            .ok_or_else(|| KanbanError::not_found("user", id.as_str()))
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .conn()
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                [username],
                user_from_row,
            )
            .optional()?)
    }

    /// Issue a new bearer token for a user
    pub fn create_session(&self, user: &UserId, ttl: Duration) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            token: format!("{}{}", ulid::Ulid::new(), ulid::Ulid::new()),
            user: user.clone(),
            expires_at: now + ttl,
        };
        self.conn().execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![session.token, user.as_str(), now, session.expires_at],
        )?;
        Ok(session)
    }

    /// Look up an unexpired session; expired tokens are removed on sight
    pub fn find_session(&self, token: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        let session = conn
            .query_row(
                "SELECT token, user_id, expires_at FROM sessions WHERE token = ?1",
                [token],
                |row| {
                    Ok(Session {
                        token: row.get(0)?,
                        user: UserId::from_string(row.get::<_, String>(1)?),
                        expires_at: row.get(2)?,
                    })
                },
            )
            .optional()?;

        match session {
            Some(session) if session.expires_at <= Utc::now() => {
                conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
                Ok(None)
            }
            other => Ok(other),
        }
    }
}
