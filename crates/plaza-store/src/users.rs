//! User account repository.

use chrono::{DateTime, Utc};
use plaza_core::UserId;
use rusqlite::{OptionalExtension, Row, params};
use tracing::debug;

use crate::connection::ConnectionPool;
use crate::errors::{Result, StoreError};
use crate::row::parse_timestamp;

/// Status line given to every fresh account.
const DEFAULT_STATUS: &str = "I am new!";

/// A stored user account.
#[derive(Clone, Debug)]
pub struct UserRecord {
    /// User ID.
    pub id: UserId,
    /// Login email (unique).
    pub email: String,
    /// Display name.
    pub name: String,
    /// Hashed password (never serialized).
    pub password_hash: String,
    /// Free-form status line.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account.
pub struct NewUser<'a> {
    /// Login email.
    pub email: &'a str,
    /// Display name.
    pub name: &'a str,
    /// Already-hashed password.
    pub password_hash: &'a str,
}

/// Repository for the `users` table.
#[derive(Clone)]
pub struct UserRepository {
    pool: ConnectionPool,
}

impl UserRepository {
    /// Create a repository over the given pool.
    #[must_use]
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Insert a new account. Fails with [`StoreError::DuplicateEmail`] when
    /// the email is already registered.
    pub fn create(&self, user: &NewUser<'_>) -> Result<UserRecord> {
        let conn = self.pool.get()?;
        let id = UserId::new();
        let now = Utc::now().to_rfc3339();
        let result = conn.execute(
            "INSERT INTO users (id, email, name, password_hash, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![id.as_str(), user.email, user.name, user.password_hash, DEFAULT_STATUS, now],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, Some(ref msg)))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
                    && msg.contains("users.email") =>
            {
                return Err(StoreError::DuplicateEmail(user.email.to_owned()));
            }
            Err(e) => return Err(e.into()),
        }
        debug!(user_id = %id, "user created");
        drop(conn);
        self.find_by_id(&id)?.ok_or(StoreError::NotFound {
            entity: "user",
            id: id.into_inner(),
        })
    }

    /// Look an account up by login email.
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, email, name, password_hash, status, created_at, updated_at
                 FROM users WHERE email = ?1",
                params![email],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Look an account up by ID.
    pub fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, email, name, password_hash, status, created_at, updated_at
                 FROM users WHERE id = ?1",
                params![id.as_str()],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Replace a user's status line.
    pub fn update_status(&self, id: &UserId, status: &str) -> Result<()> {
        let conn = self.pool.get()?;
        let changed = conn.execute(
            "UPDATE users SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status, Utc::now().to_rfc3339(), id.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: id.as_str().to_owned(),
            });
        }
        Ok(())
    }
}

fn map_user(row: &Row<'_>) -> std::result::Result<UserRecord, rusqlite::Error> {
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(UserRecord {
        id: UserId::from_string(row.get(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        status: row.get(4)?,
        created_at: parse_timestamp(5, &created_at)?,
        updated_at: parse_timestamp(6, &updated_at)?,
    })
}
