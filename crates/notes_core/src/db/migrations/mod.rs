//! Notes schema, versioned through `PRAGMA user_version`.
//!
//! Each step lists the tables it creates, so the same table list drives
//! both migration and the schema check run by `SqliteNoteRepository`.

use crate::db::{StoreError, StoreResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    sql: &'static str,
    tables: &'static [&'static str],
}

const SCHEMA: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        sql: include_str!("0001_notes.sql"),
        tables: &["notes"],
    },
    SchemaStep {
        version: 2,
        sql: include_str!("0002_note_tags.sql"),
        tables: &["note_tags"],
    },
];

/// Schema version written by this build.
pub fn latest_version() -> u32 {
    SCHEMA.last().map_or(0, |step| step.version)
}

/// Brings the notes schema up to [`latest_version`] in one transaction.
///
/// # Errors
/// - `StoreError::SchemaTooNew` when the store was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(StoreError::SchemaTooNew {
            found,
            supported: latest,
        });
    }

    if found < latest {
        let tx = conn.transaction()?;
        for step in SCHEMA.iter().filter(|step| step.version > found) {
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
        }
        tx.commit()?;
        info!("event=db_migrate module=db status=ok from={found} to={latest}");
    }

    ensure_notes_schema(conn)
}

/// Checks that every table created by the notes schema is present.
///
/// # Errors
/// - `StoreError::MissingTable` naming the first absent table.
pub fn ensure_notes_schema(conn: &Connection) -> StoreResult<()> {
    let mut stmt = conn.prepare(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
    )?;
    for table in SCHEMA.iter().flat_map(|step| step.tables.iter().copied()) {
        let present: bool = stmt.query_row([table], |row| row.get(0))?;
        if !present {
            return Err(StoreError::MissingTable(table));
        }
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> StoreResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
