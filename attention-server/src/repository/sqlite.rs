//! SQLite implementation of `UpdateLogRepository`.
//!
//! Persistent storage that survives service restarts. Each attention
//! update is one row; per-change ordering is carried by an explicit
//! `seq` column rather than rowids, so history replays exactly in
//! append order even after a vacuum.
//!
//! # Schema Versioning
//!
//! The database has a `schema_version` table that tracks the schema
//! version. When the schema needs to change, increment
//! `CURRENT_SCHEMA_VERSION` and add a migration in `run_migrations()`.
//! Migrations run sequentially from the current version to the target.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use attention_core::{AccountId, AttentionSetUpdate, Operation};

use super::{ChangeId, RepositoryError, UpdateLogRepository};

/// Current schema version. Increment this when making schema changes and
/// add corresponding migration logic in `run_migrations()`.
const CURRENT_SCHEMA_VERSION: i64 = 1;

/// SQLite-backed update log repository.
///
/// Uses `tokio::task::spawn_blocking` to run synchronous rusqlite
/// operations without blocking the async runtime.
pub struct SqliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Create a new SQLite repository at the given path.
    ///
    /// Creates the database file and schema if they don't exist, and runs
    /// any pending migrations if the database has an older schema.
    ///
    /// # Durability
    ///
    /// The database is configured with:
    /// - `journal_mode = WAL` for better concurrency and crash safety
    /// - `synchronous = FULL` so an applied batch survives power failure
    /// - `busy_timeout = 5000ms` to handle concurrent access gracefully
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path_ref = path.as_ref();

        let path_str = path_ref.to_string_lossy();
        if path_str != ":memory:" && !path_str.is_empty() {
            if let Some(parent) = path_ref.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        RepositoryError::storage(
                            "create database directory",
                            format!("{}: {}", parent.display(), e),
                        )
                    })?;
                }
            }
        }

        let conn = Connection::open(path_ref)
            .map_err(|e| RepositoryError::storage("open database", e.to_string()))?;

        // Verify WAL mode was actually enabled. SQLite can silently keep
        // DELETE mode on filesystems without shared memory support, which
        // would break the durability assumptions the audit log relies on.
        // In-memory databases report "memory", which is fine for tests.
        let is_in_memory = path_str == ":memory:";
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(|e| RepositoryError::storage("set journal_mode", e.to_string()))?;

        let journal_mode_ok = journal_mode.eq_ignore_ascii_case("wal")
            || (is_in_memory && journal_mode.eq_ignore_ascii_case("memory"));

        if !journal_mode_ok {
            return Err(RepositoryError::storage(
                "configure journal_mode",
                format!(
                    "Failed to enable WAL mode: SQLite returned '{}' instead of 'wal'. \
                     The attention history requires WAL mode for durability and \
                     concurrency guarantees.",
                    journal_mode
                ),
            ));
        }

        conn.execute_batch(
            r#"
            PRAGMA synchronous = FULL;
            PRAGMA busy_timeout = 5000;
            "#,
        )
        .map_err(|e| RepositoryError::storage("configure pragmas", e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| RepositoryError::storage("create schema_version table", e.to_string()))?;

        let current_version: i64 = conn
            .query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| RepositoryError::storage("get schema version", e.to_string()))?
            .unwrap_or(0);

        Self::run_migrations(&conn, current_version)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run migrations from `from_version` to `CURRENT_SCHEMA_VERSION`.
    fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), RepositoryError> {
        if from_version > CURRENT_SCHEMA_VERSION {
            return Err(RepositoryError::storage(
                "schema version",
                format!(
                    "Database schema version {} is newer than supported version {}. \
                     Please upgrade the application.",
                    from_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }

        if from_version == CURRENT_SCHEMA_VERSION {
            return Ok(());
        }

        if from_version < 1 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS attention_updates (
                    project TEXT NOT NULL,
                    change_number INTEGER NOT NULL,
                    seq INTEGER NOT NULL,
                    timestamp_micros INTEGER NOT NULL,
                    account TEXT NOT NULL,
                    operation TEXT NOT NULL,
                    reason TEXT NOT NULL,
                    PRIMARY KEY (project, change_number, seq)
                );
                "#,
            )
            .map_err(|e| RepositoryError::storage("migration v1", e.to_string()))?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
            params![CURRENT_SCHEMA_VERSION],
        )
        .map_err(|e| RepositoryError::storage("update schema version", e.to_string()))?;

        Ok(())
    }

    /// Create a new in-memory SQLite repository (for testing).
    pub fn new_in_memory() -> Result<Self, RepositoryError> {
        Self::new(":memory:")
    }
}

/// Convert a change number (u64) to i64 for SQLite storage.
///
/// Returns an error rather than silently wrapping with `as i64`.
fn change_number_to_i64(number: u64, operation: &'static str) -> Result<i64, RepositoryError> {
    i64::try_from(number).map_err(|_| {
        RepositoryError::storage(
            operation,
            format!(
                "change number {} exceeds maximum storable value ({})",
                number,
                i64::MAX
            ),
        )
    })
}

#[async_trait]
impl UpdateLogRepository for SqliteRepository {
    async fn history(&self, change: &ChangeId) -> Result<Vec<AttentionSetUpdate>, RepositoryError> {
        let conn = self.conn.clone();
        let project = change.project.clone();
        let number = change_number_to_i64(change.number, "load history")?;

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();

            let mut stmt = conn
                .prepare(
                    "SELECT timestamp_micros, account, operation, reason
                     FROM attention_updates
                     WHERE project = ?1 AND change_number = ?2
                     ORDER BY seq ASC",
                )
                .map_err(|e| RepositoryError::storage("load history", e.to_string()))?;

            let rows = stmt
                .query_map(params![project, number], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })
                .map_err(|e| RepositoryError::storage("load history", e.to_string()))?;

            let mut history = Vec::new();
            for row in rows {
                let (timestamp_micros, account, operation, reason) =
                    row.map_err(|e| RepositoryError::storage("load history", e.to_string()))?;
                let operation = Operation::parse(&operation).ok_or_else(|| {
                    RepositoryError::corruption(format!(
                        "unknown operation '{}' for account {}",
                        operation, account
                    ))
                })?;
                history.push(AttentionSetUpdate {
                    timestamp_micros,
                    account: AccountId(account),
                    operation,
                    reason,
                });
            }
            Ok(history)
        })
        .await
        .map_err(|e| RepositoryError::storage("load history", e.to_string()))?
    }

    async fn append(
        &self,
        change: &ChangeId,
        updates: &[AttentionSetUpdate],
    ) -> Result<(), RepositoryError> {
        if updates.is_empty() {
            return Ok(());
        }

        let conn = self.conn.clone();
        let project = change.project.clone();
        let number = change_number_to_i64(change.number, "append updates")?;
        let updates = updates.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap();
            let tx = conn
                .transaction()
                .map_err(|e| RepositoryError::storage("append updates", e.to_string()))?;

            let next_seq: i64 = tx
                .query_row(
                    "SELECT COALESCE(MAX(seq), -1) + 1 FROM attention_updates
                     WHERE project = ?1 AND change_number = ?2",
                    params![project, number],
                    |row| row.get(0),
                )
                .map_err(|e| RepositoryError::storage("append updates", e.to_string()))?;

            for (offset, update) in updates.iter().enumerate() {
                tx.execute(
                    "INSERT INTO attention_updates
                     (project, change_number, seq, timestamp_micros, account, operation, reason)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        project,
                        number,
                        next_seq + offset as i64,
                        update.timestamp_micros,
                        update.account.0,
                        update.operation.as_str(),
                        update.reason,
                    ],
                )
                .map_err(|e| RepositoryError::storage("append updates", e.to_string()))?;
            }

            tx.commit()
                .map_err(|e| RepositoryError::storage("append updates", e.to_string()))
        })
        .await
        .map_err(|e| RepositoryError::storage("append updates", e.to_string()))?
    }
}
