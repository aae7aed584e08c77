//! Migration state reconciler.
//!
//! Drives a [`Database`] from its merged migration state: apply everything
//! pending, roll back everything applied, or both. Steps run one at a time
//! in name order and the first failure stops the run.

use sapling_core::{Database, MigrationRecord};
use tracing::info;

use crate::error::{Direction, MigrateError, Result};

/// Runs migrations against a backend.
#[derive(Debug)]
pub struct Migrator<'a, D: Database> {
    db: &'a D,
}

impl<'a, D: Database> Migrator<'a, D> {
    /// Creates a migrator over `db`.
    #[must_use]
    pub const fn new(db: &'a D) -> Self {
        Self { db }
    }

    /// Returns the merged migration state, sorted by name.
    pub async fn state(&self) -> Result<Vec<MigrationRecord>> {
        self.db
            .list_migration_state()
            .await
            .map_err(MigrateError::State)
    }

    /// Applies every migration that is not applied, in ascending order.
    ///
    /// Returns the names applied.
    pub async fn migrate(&self) -> Result<Vec<String>> {
        let pending: Vec<String> = self
            .state()
            .await?
            .into_iter()
            .filter(|record| !record.is_applied())
            .map(|record| record.name)
            .collect();

        if pending.is_empty() {
            info!("No migrations to apply");
            return Ok(pending);
        }
        info!(count = pending.len(), "Applying migrations");
        self.run(&pending, Direction::Up).await?;
        Ok(pending)
    }

    /// Rolls back every applied migration, in ascending order.
    ///
    /// Returns the names rolled back.
    pub async fn rollback(&self) -> Result<Vec<String>> {
        let applied: Vec<String> = self
            .state()
            .await?
            .into_iter()
            .filter(MigrationRecord::is_applied)
            .map(|record| record.name)
            .collect();

        if applied.is_empty() {
            info!("No migrations to roll back");
            return Ok(applied);
        }
        info!(count = applied.len(), "Rolling back migrations");
        self.run(&applied, Direction::Down).await?;
        Ok(applied)
    }

    /// Rolls back the `steps` most recent applied migrations, newest first.
    ///
    /// "Most recent" is by name, which is also the apply order.
    pub async fn rollback_latest(&self, steps: usize) -> Result<Vec<String>> {
        let latest: Vec<String> = self
            .state()
            .await?
            .into_iter()
            .rev()
            .filter(MigrationRecord::is_applied)
            .take(steps)
            .map(|record| record.name)
            .collect();

        if latest.is_empty() {
            info!("No migrations to roll back");
            return Ok(latest);
        }
        info!(count = latest.len(), "Rolling back latest migrations");
        self.run(&latest, Direction::Down).await?;
        Ok(latest)
    }

    /// Rolls back everything applied, then applies everything.
    ///
    /// Returns the names rolled back and the names applied.
    pub async fn reset(&self) -> Result<(Vec<String>, Vec<String>)> {
        let rolled_back = self.rollback().await?;
        let applied = self.migrate().await?;
        Ok((rolled_back, applied))
    }

    async fn run(&self, names: &[String], direction: Direction) -> Result<()> {
        for name in names {
            let outcome = match direction {
                Direction::Up => self.db.execute_migration(name).await,
                Direction::Down => self.db.rollback_migration(name).await,
            };
            outcome.map_err(|source| MigrateError::Step {
                name: name.clone(),
                direction,
                source,
            })?;
        }
        Ok(())
    }
}
