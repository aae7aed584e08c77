//! Backend contract and migration state.
//!
//! A backend implements [`Database`]. The migration reconciler and the
//! model layer only talk to that trait.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ast::{QueryIntent, SqlValue};
use crate::compiler::PreparedStatement;
use crate::error::Result;
use crate::metadata::Metadata;

/// A fetched row: column name to value, in result order.
pub type Row = IndexMap<String, SqlValue>;

/// Which source of truth knows a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Only the local catalog.
    Local,
    /// Only the ledger.
    Remote,
    /// Both.
    Both,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
            Self::Both => write!(f, "local+remote"),
        }
    }
}

/// Merged view of one migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Migration name, also its ordering key.
    pub name: String,
    /// When it was applied; `None` if never applied or rolled back.
    pub applied_at: Option<DateTime<Utc>>,
    /// Where the migration is known.
    pub location: Location,
}

impl MigrationRecord {
    /// Returns whether the migration is currently applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Merges local migration names with ledger rows.
///
/// The result is sorted by name, byte-wise ascending, which is also the
/// order migrations are executed and rolled back in.
pub fn merge_migration_state<L, R>(local: L, remote: R) -> Vec<MigrationRecord>
where
    L: IntoIterator<Item = String>,
    R: IntoIterator<Item = (String, Option<DateTime<Utc>>)>,
{
    let mut merged: BTreeMap<String, MigrationRecord> = local
        .into_iter()
        .map(|name| {
            let record = MigrationRecord {
                name: name.clone(),
                applied_at: None,
                location: Location::Local,
            };
            (name, record)
        })
        .collect();

    for (name, applied_at) in remote {
        merged
            .entry(name.clone())
            .and_modify(|record| {
                record.location = Location::Both;
                record.applied_at = applied_at;
            })
            .or_insert(MigrationRecord {
                name,
                applied_at,
                location: Location::Remote,
            });
    }

    merged.into_values().collect()
}

/// Relational backend contract.
///
/// Migration methods must be called sequentially; query methods may be
/// called concurrently.
pub trait Database: Send + Sync {
    /// Creates the migration ledger table.
    ///
    /// Fails with [`LedgerStateConflict`](crate::Error::LedgerStateConflict)
    /// if it already exists.
    fn setup_migration_table(&self) -> impl Future<Output = Result<()>> + Send;

    /// Drops the migration ledger table; a no-op if it does not exist.
    fn teardown_migration_table(&self) -> impl Future<Output = Result<()>> + Send;

    /// Returns local and remote migrations merged by name.
    fn list_migration_state(&self) -> impl Future<Output = Result<Vec<MigrationRecord>>> + Send;

    /// Runs the `up` procedure of `name` and marks it applied.
    fn execute_migration(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Runs the `down` procedure of `name` and marks it not applied.
    fn rollback_migration(&self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Replays every local migration into structural metadata.
    fn generate_metadata(&self) -> impl Future<Output = Result<Metadata>> + Send;

    /// Compiles `intent` without running it.
    fn plan(&self, intent: &QueryIntent) -> Result<PreparedStatement>;

    /// Runs `intent` and returns every row.
    fn execute(&self, intent: &QueryIntent) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Returns the engine's plan for `intent`, one JSON object per line.
    fn explain(&self, intent: &QueryIntent) -> impl Future<Output = Result<String>> + Send;
}
