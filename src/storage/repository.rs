//! SQLite store for fetched lake levels

use chrono::{DateTime, Utc};
use rusqlite::{ffi, params, Connection, ErrorCode};
use std::path::Path;
use tracing::{debug, info};

use super::schema::create_tables;
use crate::error::{LakeLevelsError, Result};
use crate::types::{LakeLevels, LevelTable};

/// Store owning the connection to the lake levels database
pub struct LevelStore {
    conn: Connection,
}

impl LevelStore {
    /// Open the store, creating the file and schema if needed
    pub fn open(db_path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        create_tables(&conn)?;
        debug!("Opened lake level store at {}", db_path.display());

        Ok(Self { conn })
    }

    /// Create an in-memory store (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Insert every row of `table` in one transaction.
    ///
    /// If any timestamp is already stored nothing from this call is kept
    /// and `UniquenessViolation` is returned.
    pub fn insert(&mut self, table: &LevelTable) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO levels (timestamp, mendota, monona, waubesa, kegonsa)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;

            for row in table {
                stmt.execute(params![
                    row.timestamp,
                    row.mendota,
                    row.monona,
                    row.waubesa,
                    row.kegonsa,
                ])
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        LakeLevelsError::UniquenessViolation(row.timestamp)
                    } else {
                        LakeLevelsError::Database(e)
                    }
                })?;
            }
        }
        tx.commit()?;

        info!("Inserted {} rows into levels", table.len());
        Ok(table.len())
    }

    /// Read every stored row back, ordered by timestamp
    pub fn to_table(&self) -> Result<LevelTable> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, mendota, monona, waubesa, kegonsa
            FROM levels
            ORDER BY timestamp
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LakeLevels {
                    timestamp: row.get(0)?,
                    mendota: row.get(1)?,
                    monona: row.get(2)?,
                    waubesa: row.get(3)?,
                    kegonsa: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        LevelTable::from_rows(rows)
    }

    /// Number of stored rows
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM levels", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Most recent stored timestamp (for resuming updates)
    pub fn latest_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> = self
            .conn
            .query_row("SELECT MAX(timestamp) FROM levels", [], |row| row.get(0))?;
        Ok(latest)
    }

    /// Close the connection, reporting any error from SQLite
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| LakeLevelsError::Database(e))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && (e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}
