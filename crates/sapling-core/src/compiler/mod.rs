//! Statement compiler.
//!
//! Turns a [`QueryIntent`] into a [`PreparedStatement`]: SQL fragments in
//! which every identifier passed the safe-name check and every value is a
//! generated placeholder. The intent is only read.
//!
//! # Example
//!
//! ```rust
//! use sapling_core::ast::{Predicate, QueryIntent};
//! use sapling_core::compiler::{compile, SequentialPlaceholders};
//! use sapling_core::SqlValue;
//!
//! let intent = QueryIntent::read("users").filter(Predicate::ge("age", 18));
//! let stmt = compile(&intent, &SequentialPlaceholders::new())?;
//!
//! assert_eq!(stmt.sql_text(), "SELECT * FROM users WHERE ( age >= :p_1 )");
//! assert_eq!(stmt.values[":p_1"], SqlValue::Int(18));
//! # Ok::<(), sapling_core::Error>(())
//! ```

mod placeholder;
mod predicate;

use indexmap::IndexMap;
use serde::Serialize;

use crate::ast::{QueryIntent, SqlValue};
use crate::error::Result;
use crate::identifier::{ensure_safe, IdentifierKind};

pub use placeholder::{
    is_placeholder, PlaceholderSource, RandomPlaceholders, SequentialPlaceholders,
    PLACEHOLDER_PREFIX,
};

use predicate::Position;

/// SQL fragments plus the values bound to their placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreparedStatement {
    /// Ordered SQL fragments.
    pub sql: Vec<String>,
    /// Placeholder name to bound value.
    pub values: IndexMap<String, SqlValue>,
}

impl PreparedStatement {
    /// Joins the fragments with single spaces.
    #[must_use]
    pub fn sql_text(&self) -> String {
        self.sql.join(" ")
    }

    /// Returns whether `fragment` is one of this statement's placeholders.
    #[must_use]
    pub fn is_bound(&self, fragment: &str) -> bool {
        is_placeholder(fragment) && self.values.contains_key(fragment)
    }
}

/// Compiles a read intent into a single-table `SELECT`.
pub fn compile(
    intent: &QueryIntent,
    placeholders: &dyn PlaceholderSource,
) -> Result<PreparedStatement> {
    let mut writer = StatementWriter::new(placeholders);

    writer.push("SELECT");
    if intent.columns.is_empty() {
        writer.push("*");
    } else {
        writer.push_column_list(&intent.columns)?;
    }

    ensure_safe(IdentifierKind::Table, &intent.table)?;
    writer.push(format!("FROM {}", intent.table));

    if let Some(predicate) = &intent.predicate {
        writer.push("WHERE");
        writer.push("(");
        writer.push_predicate(predicate, Position::Filter)?;
        writer.push(")");
    }

    if !intent.group_by.is_empty() {
        writer.push("GROUP BY");
        writer.push_column_list(&intent.group_by)?;
    }

    if let Some(having) = &intent.having {
        writer.push("HAVING");
        writer.push("(");
        writer.push_predicate(having, Position::Filter)?;
        writer.push(")");
    }

    if let Some(order) = &intent.order {
        writer.push("ORDER BY");
        writer.push_predicate(order, Position::Order)?;
        writer.push(intent.order_direction.as_sql());
    }

    // SQLite only accepts OFFSET after a LIMIT; -1 means no limit.
    let limit = match (intent.limit, intent.offset) {
        (Some(n), _) => Some(i64::try_from(n).unwrap_or(i64::MAX)),
        (None, Some(_)) => Some(-1),
        (None, None) => None,
    };
    if let Some(n) = limit {
        writer.push("LIMIT");
        writer.push_value(SqlValue::Int(n));
    }
    if let Some(n) = intent.offset {
        writer.push("OFFSET");
        writer.push_value(SqlValue::Int(i64::try_from(n).unwrap_or(i64::MAX)));
    }

    Ok(writer.finish())
}

/// Accumulates fragments and bound values for one statement.
struct StatementWriter<'a> {
    placeholders: &'a dyn PlaceholderSource,
    statement: PreparedStatement,
}

impl<'a> StatementWriter<'a> {
    fn new(placeholders: &'a dyn PlaceholderSource) -> Self {
        Self {
            placeholders,
            statement: PreparedStatement::default(),
        }
    }

    fn push(&mut self, fragment: impl Into<String>) {
        self.statement.sql.push(fragment.into());
    }

    fn push_value(&mut self, value: SqlValue) {
        let mut name = self.placeholders.next_name();
        while self.statement.values.contains_key(&name) {
            name = self.placeholders.next_name();
        }
        self.statement.values.insert(name.clone(), value);
        self.push(name);
    }

    fn push_column_list(&mut self, columns: &[String]) -> Result<()> {
        for (i, column) in columns.iter().enumerate() {
            ensure_safe(IdentifierKind::Column, column)?;
            if i > 0 {
                self.push(",");
            }
            self.push(column.as_str());
        }
        Ok(())
    }

    fn finish(self) -> PreparedStatement {
        self.statement
    }
}
