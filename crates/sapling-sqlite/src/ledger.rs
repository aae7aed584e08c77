//! Migration ledger.
//!
//! The `_sapling_migrations` table records which migrations are applied.
//! Rolling back keeps the row and clears its timestamp.

use chrono::{DateTime, NaiveDateTime, Utc};
use sapling_core::schema::{Schema, TableBuilder};
use sapling_core::{Error, LedgerConflict, Result, SqlValue};
use sqlx::SqlitePool;

use crate::bind::decode_row;
use crate::schema::SqliteSchema;

/// Name of the ledger table.
pub const LEDGER_TABLE: &str = "_sapling_migrations";

/// Stands in for the name of a row whose name is not text.
const UNREADABLE_NAME: &str = "<name>";

const SELECT_LEDGER_SQL: &str = "SELECT name, migrated_at FROM _sapling_migrations";

const MARK_APPLIED_SQL: &str = "INSERT INTO _sapling_migrations (name, migrated_at) \
     VALUES (?, CURRENT_TIMESTAMP) \
     ON CONFLICT(name) DO UPDATE SET migrated_at = CURRENT_TIMESTAMP";

const MARK_ROLLED_BACK_SQL: &str = "INSERT INTO _sapling_migrations (name, migrated_at) \
     VALUES (?, NULL) \
     ON CONFLICT(name) DO UPDATE SET migrated_at = NULL";

fn ledger_columns(t: &mut TableBuilder) -> Result<()> {
    t.text("name")?.primary()?;
    t.numeric("migrated_at")?.nullable().default_now()?;
    Ok(())
}

pub(crate) const fn conflict(kind: LedgerConflict) -> Error {
    Error::LedgerStateConflict {
        table: LEDGER_TABLE,
        conflict: kind,
    }
}

/// Creates the ledger table, failing if it exists.
pub(crate) async fn create(schema: &mut SqliteSchema) -> Result<()> {
    if schema.has_table(LEDGER_TABLE).await? {
        return Err(conflict(LedgerConflict::AlreadyExists));
    }
    schema.create_table(LEDGER_TABLE, &ledger_columns).await
}

/// Drops the ledger table if it exists.
pub(crate) async fn remove(schema: &mut SqliteSchema) -> Result<bool> {
    if !schema.has_table(LEDGER_TABLE).await? {
        return Ok(false);
    }
    schema.drop_table(LEDGER_TABLE).await?;
    Ok(true)
}

/// Fails unless the ledger table exists.
pub(crate) async fn require(schema: &SqliteSchema) -> Result<()> {
    if schema.has_table(LEDGER_TABLE).await? {
        Ok(())
    } else {
        Err(conflict(LedgerConflict::Missing))
    }
}

/// Returns every ledger row as `(name, applied_at)`.
pub(crate) async fn rows(pool: &SqlitePool) -> Result<Vec<(String, Option<DateTime<Utc>>)>> {
    let rows = sqlx::query(SELECT_LEDGER_SQL)
        .fetch_all(pool)
        .await
        .map_err(Error::driver)?;

    rows.iter()
        .map(|row| {
            let mut row = decode_row(row)?;
            let name = match row.shift_remove("name") {
                Some(SqlValue::Text(name)) => name,
                other => {
                    return Err(Error::CorruptLedger {
                        name: UNREADABLE_NAME.to_string(),
                        value: format!("{other:?}"),
                    })
                }
            };
            let applied_at = match row.shift_remove("migrated_at") {
                None | Some(SqlValue::Null) => None,
                Some(SqlValue::Text(value)) => Some(parse_timestamp(&name, &value)?),
                Some(other) => {
                    return Err(Error::CorruptLedger {
                        name,
                        value: format!("{other:?}"),
                    })
                }
            };
            Ok((name, applied_at))
        })
        .collect()
}

/// Marks `name` applied now.
pub(crate) async fn mark_applied(schema: &SqliteSchema, name: &str) -> Result<()> {
    schema.mutate(MARK_APPLIED_SQL, Some(name)).await?;
    Ok(())
}

/// Marks `name` not applied, keeping its row.
pub(crate) async fn mark_rolled_back(schema: &SqliteSchema, name: &str) -> Result<()> {
    schema.mutate(MARK_ROLLED_BACK_SQL, Some(name)).await?;
    Ok(())
}

/// Parses a ledger timestamp: SQLite's `YYYY-MM-DD HH:MM:SS`, or RFC 3339.
pub(crate) fn parse_timestamp(name: &str, value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|_| Error::CorruptLedger {
            name: name.to_string(),
            value: value.to_string(),
        })
}
