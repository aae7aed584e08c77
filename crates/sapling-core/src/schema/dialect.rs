//! SQL dialect support.
//!
//! A dialect maps the column type vocabulary to the DDL type names of one
//! engine. Types the engine cannot store are rejected here, at the backend
//! boundary, rather than in the builder.

use super::column_builder::{ColumnBuilder, ColumnType, ModifierKind};
use crate::error::{Error, Result};

/// Trait for database-specific DDL generation.
pub trait Dialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the DDL type name for `column_type`.
    fn type_name(&self, column_type: &ColumnType) -> Result<&'static str>;

    /// Generates the column definition used by `CREATE TABLE` and
    /// `ALTER TABLE ... ADD COLUMN`.
    fn column_definition(&self, column: &ColumnBuilder) -> Result<String> {
        let mut parts = vec![
            column.name().to_string(),
            self.type_name(column.column_type())?.to_string(),
        ];
        parts.extend(column.modifiers().map(super::Modifier::to_sql));
        Ok(parts.join(" "))
    }

    /// Checks that `column` can be added to the existing table `table`.
    ///
    /// Runs before any statement of an `update_table` call is issued.
    fn check_add_column(&self, _table: &str, _column: &ColumnBuilder) -> Result<()> {
        Ok(())
    }

    /// Builds the error for a modifier this dialect cannot add to an
    /// existing table.
    fn unsupported_add_column(
        &self,
        table: &str,
        column: &ColumnBuilder,
        modifier: ModifierKind,
    ) -> Error {
        Error::UnsupportedAddColumn {
            dialect: self.name(),
            table: table.to_string(),
            column: column.name().to_string(),
            modifier,
        }
    }

    /// Builds the error for a type this dialect cannot store.
    fn unsupported(&self, column_type: &ColumnType) -> Error {
        Error::UnsupportedColumnType {
            dialect: self.name(),
            type_name: column_type.to_string(),
        }
    }
}

/// A dialect accepting the whole type vocabulary under its standard names.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn type_name(&self, column_type: &ColumnType) -> Result<&'static str> {
        match column_type {
            ColumnType::Integer => Ok("INTEGER"),
            ColumnType::Text => Ok("TEXT"),
            ColumnType::Real => Ok("REAL"),
            ColumnType::Blob => Ok("BLOB"),
            ColumnType::Numeric => Ok("NUMERIC"),
            ColumnType::Timestamp => Ok("TIMESTAMP"),
            ColumnType::Named(_) => Err(self.unsupported(column_type)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_dialect() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.name(), "generic");
        assert_eq!(dialect.type_name(&ColumnType::Timestamp).unwrap(), "TIMESTAMP");
    }

    #[test]
    fn test_named_type_rejected() {
        let err = GenericDialect
            .type_name(&ColumnType::Named("JSONB".into()))
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported column type for generic: JSONB");
    }

    #[test]
    fn test_column_definition_order() {
        let mut column = ColumnBuilder::new("email", ColumnType::Text).unwrap();
        column.default_str("none").unwrap();
        column.unique().unwrap();
        assert_eq!(
            GenericDialect.column_definition(&column).unwrap(),
            "email TEXT NOT NULL UNIQUE DEFAULT 'none'"
        );
    }
}
