//! Table definition builder.
//!
//! A [`TableBuilder`] is handed to the body closure of
//! [`Schema::create_table`](super::Schema::create_table) and
//! [`Schema::update_table`](super::Schema::update_table). The live schema
//! turns it into DDL, the metadata collector into [`ModelMetadata`].
//!
//! # Example
//!
//! ```rust
//! use sapling_core::schema::{GenericDialect, TableBuilder};
//!
//! let mut table = TableBuilder::new("posts")?;
//! table.increments("id")?;
//! table.text("title")?.unique()?;
//! table.integer("author_id")?.references("users", "id")?;
//! table.created_at()?;
//!
//! let sql = table.to_create_sql(&GenericDialect)?;
//! assert!(sql.starts_with("CREATE TABLE posts ("));
//! # Ok::<(), sapling_core::Error>(())
//! ```

use indexmap::IndexMap;

use super::column_builder::{ColumnBuilder, ColumnType};
use super::dialect::Dialect;
use crate::error::{Error, Result};
use crate::identifier::{ensure_safe, IdentifierKind};
use crate::metadata::ModelMetadata;

/// Builder collecting the columns of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBuilder {
    name: String,
    columns: Vec<ColumnBuilder>,
}

impl TableBuilder {
    /// Creates an empty table builder, rejecting unsafe names.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        ensure_safe(IdentifierKind::Table, &name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
        })
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnBuilder] {
        &self.columns
    }

    /// Appends a column and returns it for further modifiers.
    pub fn add_column(&mut self, column: ColumnBuilder) -> Result<&mut ColumnBuilder> {
        if self.columns.iter().any(|c| c.name() == column.name()) {
            return Err(Error::DuplicateColumn {
                table: self.name.clone(),
                column: column.name().to_string(),
            });
        }
        let index = self.columns.len();
        self.columns.push(column);
        Ok(&mut self.columns[index])
    }

    fn typed(&mut self, name: &str, column_type: ColumnType) -> Result<&mut ColumnBuilder> {
        self.add_column(ColumnBuilder::new(name, column_type)?)
    }

    /// Adds an INTEGER column.
    pub fn integer(&mut self, name: &str) -> Result<&mut ColumnBuilder> {
        self.typed(name, ColumnType::Integer)
    }

    /// Adds a TEXT column.
    pub fn text(&mut self, name: &str) -> Result<&mut ColumnBuilder> {
        self.typed(name, ColumnType::Text)
    }

    /// Adds a REAL column.
    pub fn real(&mut self, name: &str) -> Result<&mut ColumnBuilder> {
        self.typed(name, ColumnType::Real)
    }

    /// Adds a BLOB column.
    pub fn blob(&mut self, name: &str) -> Result<&mut ColumnBuilder> {
        self.typed(name, ColumnType::Blob)
    }

    /// Adds a NUMERIC column.
    pub fn numeric(&mut self, name: &str) -> Result<&mut ColumnBuilder> {
        self.typed(name, ColumnType::Numeric)
    }

    /// Adds a timestamp column.
    pub fn timestamp(&mut self, name: &str) -> Result<&mut ColumnBuilder> {
        self.typed(name, ColumnType::Timestamp)
    }

    /// Adds a column whose type is spelled by the caller.
    pub fn column(&mut self, name: &str, type_name: &str) -> Result<&mut ColumnBuilder> {
        let column_type = ColumnType::parse(type_name)?;
        self.typed(name, column_type)
    }

    /// Adds an auto-incrementing integer primary key.
    pub fn increments(&mut self, name: &str) -> Result<&mut ColumnBuilder> {
        let column = self.integer(name)?;
        column.primary()?;
        column.autoincrement()
    }

    /// Adds `created_at`, defaulting to the time of insertion.
    pub fn created_at(&mut self) -> Result<&mut ColumnBuilder> {
        self.timestamp("created_at")?.default_now()
    }

    /// Adds `updated_at`, defaulting to the time of insertion.
    pub fn updated_at(&mut self) -> Result<&mut ColumnBuilder> {
        self.timestamp("updated_at")?.default_now()
    }

    /// Checks that `dialect` can store every column type.
    pub fn check_types(&self, dialect: &dyn Dialect) -> Result<()> {
        for column in &self.columns {
            dialect.type_name(column.column_type())?;
        }
        Ok(())
    }

    /// Checks that `dialect` can create this table.
    pub fn check_create(&self, dialect: &dyn Dialect) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::EmptyTable(self.name.clone()));
        }
        self.check_types(dialect)
    }

    /// Checks that `dialect` can add every column to the existing table.
    pub fn check_update(&self, dialect: &dyn Dialect) -> Result<()> {
        self.check_types(dialect)?;
        for column in &self.columns {
            dialect.check_add_column(&self.name, column)?;
        }
        Ok(())
    }

    /// Generates the `CREATE TABLE` statement.
    pub fn to_create_sql(&self, dialect: &dyn Dialect) -> Result<String> {
        if self.columns.is_empty() {
            return Err(Error::EmptyTable(self.name.clone()));
        }
        let definitions = self
            .columns
            .iter()
            .map(|column| dialect.column_definition(column))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "CREATE TABLE {} (\n  {}\n)",
            self.name,
            definitions.join(",\n  ")
        ))
    }

    /// Generates one `ALTER TABLE ... ADD COLUMN` statement per column.
    pub fn to_add_column_sql(&self, dialect: &dyn Dialect) -> Result<Vec<String>> {
        self.check_update(dialect)?;
        self.columns
            .iter()
            .map(|column| {
                Ok(format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    self.name,
                    dialect.column_definition(column)?
                ))
            })
            .collect()
    }

    /// Returns the metadata of the declared table.
    #[must_use]
    pub fn to_metadata(&self) -> ModelMetadata {
        let columns: IndexMap<_, _> = self
            .columns
            .iter()
            .map(|column| (column.name().to_string(), column.to_metadata()))
            .collect();
        ModelMetadata::new(self.name.clone(), columns)
    }
}
