//! Read intents.

use super::predicate::Predicate;
use super::value::ToSqlValue;

/// Sort direction of the `ORDER BY` clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order (ASC).
    #[default]
    Asc,
    /// Descending order (DESC).
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A read request against a single table.
///
/// Built by the model layer and handed to the compiler, which only reads
/// it. Every builder method consumes and returns the intent.
///
/// # Example
///
/// ```rust
/// use sapling_core::ast::{Predicate, QueryIntent};
///
/// let intent = QueryIntent::read("users")
///     .select(["id", "email"])
///     .filter(Predicate::ge("age", 18))
///     .order_by(Predicate::columns(["created_at"]))
///     .descending()
///     .limit(10);
///
/// assert_eq!(intent.table, "users");
/// assert_eq!(intent.limit, Some(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryIntent {
    /// Source table.
    pub table: String,
    /// Selected columns; empty selects every column.
    pub columns: Vec<String>,
    /// `WHERE` condition.
    pub predicate: Option<Predicate>,
    /// `GROUP BY` columns.
    pub group_by: Vec<String>,
    /// `HAVING` condition.
    pub having: Option<Predicate>,
    /// `ORDER BY` expression.
    pub order: Option<Predicate>,
    /// Direction applied to `order`.
    pub order_direction: OrderDirection,
    /// `LIMIT` row count.
    pub limit: Option<u64>,
    /// `OFFSET` row count.
    pub offset: Option<u64>,
}

impl QueryIntent {
    /// Reads every row and column of `table`.
    pub fn read(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            predicate: None,
            group_by: Vec::new(),
            having: None,
            order: None,
            order_direction: OrderDirection::Asc,
            limit: None,
            offset: None,
        }
    }

    /// Reads the row whose `primary_key` column equals `value`.
    pub fn find<V: ToSqlValue>(
        table: impl Into<String>,
        primary_key: impl Into<String>,
        value: V,
    ) -> Self {
        Self::read(table).filter(Predicate::eq(primary_key, value))
    }

    /// Reads the rows whose `primary_key` column is one of `values`.
    pub fn find_many<V: ToSqlValue>(
        table: impl Into<String>,
        primary_key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::read(table).filter(Predicate::is_in(primary_key, values))
    }

    /// Restricts the selected columns.
    #[must_use]
    pub fn select<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the `WHERE` condition.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Sets the `GROUP BY` columns.
    #[must_use]
    pub fn group_by<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the `HAVING` condition.
    #[must_use]
    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    /// Sets the `ORDER BY` expression.
    #[must_use]
    pub fn order_by(mut self, order: Predicate) -> Self {
        self.order = Some(order);
        self
    }

    /// Orders descending.
    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.order_direction = OrderDirection::Desc;
        self
    }

    /// Orders ascending (the default).
    #[must_use]
    pub const fn ascending(mut self) -> Self {
        self.order_direction = OrderDirection::Asc;
        self
    }

    /// Sets the `LIMIT`.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the `OFFSET`.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LogicalOperator, SqlValue};

    #[test]
    fn test_read_defaults() {
        let intent = QueryIntent::read("users");
        assert!(intent.columns.is_empty());
        assert!(intent.predicate.is_none());
        assert_eq!(intent.order_direction, OrderDirection::Asc);
        assert_eq!(intent.limit, None);
        assert_eq!(intent.offset, None);
    }

    #[test]
    fn test_find_many_uses_in() {
        let intent = QueryIntent::find_many("users", "id", [4_i64, 8]);
        match intent.predicate {
            Some(Predicate::Logical {
                ref column,
                operator: LogicalOperator::In,
                ref children,
            }) => {
                assert_eq!(column, "id");
                assert_eq!(children[1], Predicate::Value(SqlValue::Int(8)));
            }
            other => panic!("expected IN predicate, got {other:?}"),
        }
    }
}
