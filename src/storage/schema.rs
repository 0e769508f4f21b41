//! SQLite schema for the `levels` table

use rusqlite::{Connection, Result};

/// Create the `levels` table if it does not exist
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS levels (
            timestamp TEXT NOT NULL UNIQUE,
            mendota REAL,
            monona REAL,
            waubesa REAL,
            kegonsa REAL
        )
        "#,
        [],
    )?;

    Ok(())
}
