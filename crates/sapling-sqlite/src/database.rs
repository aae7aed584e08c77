//! SQLite implementation of the [`Database`] contract.

use std::str::FromStr;
use std::sync::Arc;

use sapling_core::ast::QueryIntent;
use sapling_core::schema::MetadataSchema;
use sapling_core::{
    compile, merge_migration_state, Database, Error, Metadata, MigrationCatalog, MigrationRecord,
    PreparedStatement, Registry, Result, Row, SqlValue, TraceEvent,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::bind::{bind_all, decode_row, positional};
use crate::dialect::SqliteDialect;
use crate::ledger;
use crate::schema::SqliteSchema;

/// A SQLite backend over a single-connection pool.
///
/// One connection keeps `sqlite::memory:` databases alive for the life of
/// the backend and serializes every statement.
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
    catalog: MigrationCatalog,
    registry: Arc<Registry>,
}

impl SqliteDatabase {
    /// Opens `url`, creating the database file if missing.
    pub async fn connect(url: &str, catalog: MigrationCatalog, registry: Registry) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(Error::driver)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(Error::driver)?;
        info!(url = %url, "Connected to SQLite");
        Ok(Self::with_pool(pool, catalog, registry))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn with_pool(pool: SqlitePool, catalog: MigrationCatalog, registry: Registry) -> Self {
        Self {
            pool,
            catalog,
            registry: Arc::new(registry),
        }
    }

    /// Returns the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the migration catalog.
    #[must_use]
    pub const fn catalog(&self) -> &MigrationCatalog {
        &self.catalog
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns a live schema handle sharing this backend's pool.
    #[must_use]
    pub fn schema(&self) -> SqliteSchema {
        SqliteSchema::new(self.pool.clone(), Arc::clone(&self.registry))
    }

    /// Closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch(&self, sql: &str, values: &[&SqlValue]) -> Result<Vec<Row>> {
        let rows = bind_all(sql, values)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::driver)?;
        rows.iter().map(decode_row).collect()
    }

    async fn explain_statement(&self, statement: &PreparedStatement) -> Result<String> {
        let (sql, values) = positional(statement)?;
        let sql = format!("EXPLAIN QUERY PLAN {sql}");
        let rows = self.fetch(&sql, &values).await?;
        let plan = rows
            .iter()
            .map(|row| serde_json::to_string(row).map_err(Error::driver))
            .collect::<Result<Vec<_>>>()?
            .join("\n");
        self.registry.emit(&TraceEvent::Explain {
            statement,
            plan: &plan,
        });
        Ok(plan)
    }
}

impl Database for SqliteDatabase {
    async fn setup_migration_table(&self) -> Result<()> {
        ledger::create(&mut self.schema()).await?;
        info!(table = ledger::LEDGER_TABLE, "Created migration table");
        Ok(())
    }

    async fn teardown_migration_table(&self) -> Result<()> {
        if ledger::remove(&mut self.schema()).await? {
            info!(table = ledger::LEDGER_TABLE, "Dropped migration table");
        }
        Ok(())
    }

    async fn list_migration_state(&self) -> Result<Vec<MigrationRecord>> {
        ledger::require(&self.schema()).await?;
        let local = self.catalog.local_names()?;
        let remote = ledger::rows(&self.pool).await?;
        Ok(merge_migration_state(local, remote))
    }

    async fn execute_migration(&self, name: &str) -> Result<()> {
        let script = self.catalog.load(name)?;
        let mut schema = self.schema();
        ledger::require(&schema).await?;

        info!(name = %name, "Applying migration");
        script.up(&mut schema).await?;
        ledger::mark_applied(&schema, name).await?;
        info!(name = %name, "Migration applied successfully");
        Ok(())
    }

    async fn rollback_migration(&self, name: &str) -> Result<()> {
        let script = self.catalog.load(name)?;
        let mut schema = self.schema();
        ledger::require(&schema).await?;

        info!(name = %name, "Rolling back migration");
        script.down(&mut schema).await?;
        ledger::mark_rolled_back(&schema, name).await?;
        info!(name = %name, "Migration rolled back successfully");
        Ok(())
    }

    async fn generate_metadata(&self) -> Result<Metadata> {
        let mut collector = MetadataSchema::new(SqliteDialect);
        for name in self.catalog.local_names()? {
            debug!(name = %name, "Replaying migration");
            self.catalog.load(&name)?.up(&mut collector).await?;
        }
        Ok(collector.into_metadata())
    }

    fn plan(&self, intent: &QueryIntent) -> Result<PreparedStatement> {
        let statement = compile(intent, self.registry.placeholders())?;
        self.registry.emit(&TraceEvent::Plan {
            statement: &statement,
        });
        Ok(statement)
    }

    async fn execute(&self, intent: &QueryIntent) -> Result<Vec<Row>> {
        let statement = self.plan(intent)?;
        if self.registry.auto_explain() {
            self.explain_statement(&statement).await?;
        }
        let (sql, values) = positional(&statement)?;
        let rows = self.fetch(&sql, &values).await?;
        self.registry.emit(&TraceEvent::Execute {
            statement: &statement,
            rows: rows.len(),
        });
        Ok(rows)
    }

    async fn explain(&self, intent: &QueryIntent) -> Result<String> {
        let statement = self.plan(intent)?;
        self.explain_statement(&statement).await
    }
}
