//! SQLite dialect implementation.

use sapling_core::schema::{
    ColumnBuilder, ColumnType, DefaultValue, Dialect, Modifier, ModifierKind,
};
use sapling_core::Result;

/// SQLite dialect.
///
/// Timestamps are stored with NUMERIC affinity, which keeps
/// `CURRENT_TIMESTAMP` text as written.
///
/// `ALTER TABLE ... ADD COLUMN` cannot add PRIMARY KEY or UNIQUE columns,
/// nor columns defaulting to `CURRENT_TIMESTAMP`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_name(&self, column_type: &ColumnType) -> Result<&'static str> {
        match column_type {
            ColumnType::Integer => Ok("INTEGER"),
            ColumnType::Text => Ok("TEXT"),
            ColumnType::Real => Ok("REAL"),
            ColumnType::Blob => Ok("BLOB"),
            ColumnType::Numeric | ColumnType::Timestamp => Ok("NUMERIC"),
            ColumnType::Named(_) => Err(self.unsupported(column_type)),
        }
    }

    fn check_add_column(&self, table: &str, column: &ColumnBuilder) -> Result<()> {
        for kind in [ModifierKind::PrimaryKey, ModifierKind::Unique] {
            if column.has_modifier(kind) {
                return Err(self.unsupported_add_column(table, column, kind));
            }
        }
        if let Some(Modifier::Default(DefaultValue::CurrentTimestamp)) =
            column.modifier(ModifierKind::Default)
        {
            return Err(self.unsupported_add_column(table, column, ModifierKind::Default));
        }
        Ok(())
    }
}
