//! Live schema: the [`Schema`] capability emitting DDL.

use std::sync::Arc;

use futures::future::BoxFuture;
use sapling_core::identifier::{ensure_safe, IdentifierKind};
use sapling_core::schema::{Schema, TableBody, TableBuilder};
use sapling_core::{Error, Registry, Result, TraceEvent};
use sqlx::SqlitePool;
use tracing::debug;

use crate::dialect::SqliteDialect;

/// Runs schema changes against a SQLite pool.
///
/// Each statement is executed on its own; a failure part-way through a
/// migration leaves the earlier statements applied.
#[derive(Debug, Clone)]
pub struct SqliteSchema {
    pool: SqlitePool,
    registry: Arc<Registry>,
}

impl SqliteSchema {
    /// Creates a schema handle over `pool`.
    #[must_use]
    pub const fn new(pool: SqlitePool, registry: Arc<Registry>) -> Self {
        Self { pool, registry }
    }

    /// Executes one DDL or ledger statement and reports it as a mutation.
    pub(crate) async fn mutate(&self, sql: &str, bind: Option<&str>) -> Result<u64> {
        debug!(sql = %sql, "Executing SQL");
        let mut query = sqlx::query(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows_affected = query
            .execute(&self.pool)
            .await
            .map_err(Error::driver)?
            .rows_affected();
        self.registry.emit(&TraceEvent::Mutation { sql, rows_affected });
        Ok(rows_affected)
    }

    async fn table_exists(&self, name: &str) -> Result<bool> {
        ensure_safe(IdentifierKind::Table, name)?;
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::driver)?;
        Ok(row.is_some())
    }

    fn build(name: &str, body: &TableBody<'_>) -> Result<TableBuilder> {
        let mut table = TableBuilder::new(name)?;
        body(&mut table)?;
        Ok(table)
    }

    async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM pragma_table_info(?)")
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::driver)?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn create(&self, name: &str, body: &TableBody<'_>) -> Result<()> {
        let table = Self::build(name, body)?;
        table.check_create(&SqliteDialect)?;
        self.mutate(&table.to_create_sql(&SqliteDialect)?, None)
            .await?;
        Ok(())
    }

    /// Adds columns one `ALTER` at a time, after every check has passed.
    async fn update(&self, name: &str, body: &TableBody<'_>) -> Result<()> {
        let table = Self::build(name, body)?;
        let statements = table.to_add_column_sql(&SqliteDialect)?;
        if !self.table_exists(name).await? {
            return Err(Error::TableNotFound(name.to_string()));
        }
        let existing = self.column_names(name).await?;
        if let Some(column) = table
            .columns()
            .iter()
            .find(|column| existing.iter().any(|e| e == column.name()))
        {
            return Err(Error::DuplicateColumn {
                table: name.to_string(),
                column: column.name().to_string(),
            });
        }
        for sql in statements {
            self.mutate(&sql, None).await?;
        }
        Ok(())
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        ensure_safe(IdentifierKind::Table, old_name)?;
        ensure_safe(IdentifierKind::Table, new_name)?;
        self.mutate(&format!("ALTER TABLE {old_name} RENAME TO {new_name}"), None)
            .await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        ensure_safe(IdentifierKind::Table, name)?;
        self.mutate(&format!("DROP TABLE {name}"), None).await?;
        Ok(())
    }
}

impl Schema for SqliteSchema {
    fn has_table<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool>> {
        Box::pin(self.table_exists(name))
    }

    fn create_table<'a>(
        &'a mut self,
        name: &'a str,
        body: &'a TableBody<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.create(name, body))
    }

    fn update_table<'a>(
        &'a mut self,
        name: &'a str,
        body: &'a TableBody<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.update(name, body))
    }

    fn rename_table<'a>(
        &'a mut self,
        old_name: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.rename(old_name, new_name))
    }

    fn drop_table<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.remove(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_schema() -> SqliteSchema {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory SQLite pool");
        SqliteSchema::new(pool, Arc::new(Registry::new()))
    }

    async fn columns(schema: &SqliteSchema, table: &str) -> Vec<String> {
        schema.column_names(table).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_update_rename_drop() {
        let mut schema = create_test_schema().await;
        schema
            .create_table("users", &|t| {
                t.increments("id")?;
                t.text("email")?.unique()?;
                Ok(())
            })
            .await
            .unwrap();
        assert!(schema.has_table("users").await.unwrap());

        schema
            .update_table("users", &|t| {
                t.text("bio")?.nullable();
                t.integer("karma")?.default_int(0)?;
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(columns(&schema, "users").await, vec!["id", "email", "bio", "karma"]);

        schema.rename_table("users", "members").await.unwrap();
        assert!(!schema.has_table("users").await.unwrap());
        assert!(schema.has_table("members").await.unwrap());

        schema.drop_table("members").await.unwrap();
        assert!(!schema.has_table("members").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_missing_table() {
        let mut schema = create_test_schema().await;
        let err = schema
            .update_table("ghosts", &|t| {
                t.text("name")?;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TableNotFound(ref name) if name == "ghosts"));
    }

    #[tokio::test]
    async fn test_unsafe_names_never_reach_engine() {
        let mut schema = create_test_schema().await;
        assert!(matches!(
            schema.drop_table("users; DROP TABLE x").await,
            Err(Error::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            schema
                .create_table("users", &|t| {
                    t.text("bad name")?;
                    Ok(())
                })
                .await,
            Err(Error::InvalidIdentifier { .. })
        ));
        assert!(!schema.has_table("users").await.unwrap());
    }

    #[tokio::test]
    async fn test_engine_errors_are_driver_errors() {
        let mut schema = create_test_schema().await;
        let err = schema.drop_table("ghosts").await.unwrap_err();
        assert!(matches!(err, Error::Driver(_)));
    }

    #[tokio::test]
    async fn test_update_checks_before_any_alter() {
        let mut schema = create_test_schema().await;
        schema
            .create_table("users", &|t| {
                t.increments("id")?;
                t.text("email")?;
                Ok(())
            })
            .await
            .unwrap();

        let err = schema
            .update_table("users", &|t| {
                t.text("bio")?.nullable();
                t.text("slug")?.unique()?;
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAddColumn { ref column, .. } if column == "slug"));

        let err = schema
            .update_table("users", &|t| {
                t.text("bio")?.nullable();
                t.text("email")?.nullable();
                Ok(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn { ref column, .. } if column == "email"));

        assert_eq!(columns(&schema, "users").await, vec!["id", "email"]);
    }

    #[tokio::test]
    async fn test_create_empty_table() {
        let mut schema = create_test_schema().await;
        let err = schema.create_table("empty", &|_| Ok(())).await.unwrap_err();
        assert!(matches!(err, Error::EmptyTable(_)));
        assert!(!schema.has_table("empty").await.unwrap());
    }
}
