//! Predicate trees.
//!
//! A predicate is plain data: building one never validates identifiers or
//! operator arity, so callers can assemble trees incrementally. The
//! statement compiler checks structure when it visits the tree.

use std::fmt;

use super::value::{SqlValue, ToSqlValue};

/// Operator of a [`Predicate::Comparison`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    /// Returns the SQL token for this operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Operator of a [`Predicate::Logical`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    /// Conjunction of the children.
    And,
    /// Disjunction of the children.
    Or,
    /// Negation of the single child.
    Not,
    /// Column membership in the child values.
    In,
    /// Column matches the single child pattern.
    Like,
    /// Column lies between the two child values.
    Between,
    /// Sub-query existence.
    Exists,
    /// Comparison against any sub-query row.
    Any,
    /// Comparison against all sub-query rows.
    All,
    /// Synonym of `ANY`.
    Some,
}

impl LogicalOperator {
    /// Returns the SQL keyword for this operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Like => "LIKE",
            Self::Between => "BETWEEN",
            Self::Exists => "EXISTS",
            Self::Any => "ANY",
            Self::All => "ALL",
            Self::Some => "SOME",
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A node of a filtering, grouping or ordering condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// A literal to be bound.
    Value(SqlValue),
    /// `column operator value`.
    Comparison {
        /// Compared column.
        column: String,
        /// Comparison operator.
        operator: ComparisonOperator,
        /// Bound right-hand side.
        value: SqlValue,
    },
    /// A logical operator over child nodes.
    ///
    /// `column` is the subject of `IN`, `LIKE` and `BETWEEN`; the
    /// connectives `AND`, `OR` and `NOT` ignore it.
    Logical {
        /// Subject column.
        column: String,
        /// Logical operator.
        operator: LogicalOperator,
        /// Ordered child nodes.
        children: Vec<Predicate>,
    },
    /// A list of column names, used for ordering.
    Columns(Vec<String>),
}

impl Predicate {
    /// Creates a literal node.
    pub fn value<V: ToSqlValue>(value: V) -> Self {
        Self::Value(value.to_sql_value())
    }

    /// Creates a comparison node.
    pub fn comparison<V: ToSqlValue>(
        column: impl Into<String>,
        operator: ComparisonOperator,
        value: V,
    ) -> Self {
        Self::Comparison {
            column: column.into(),
            operator,
            value: value.to_sql_value(),
        }
    }

    /// `column = value`
    pub fn eq<V: ToSqlValue>(column: impl Into<String>, value: V) -> Self {
        Self::comparison(column, ComparisonOperator::Equal, value)
    }

    /// `column <> value`
    pub fn ne<V: ToSqlValue>(column: impl Into<String>, value: V) -> Self {
        Self::comparison(column, ComparisonOperator::NotEqual, value)
    }

    /// `column < value`
    pub fn lt<V: ToSqlValue>(column: impl Into<String>, value: V) -> Self {
        Self::comparison(column, ComparisonOperator::LessThan, value)
    }

    /// `column <= value`
    pub fn le<V: ToSqlValue>(column: impl Into<String>, value: V) -> Self {
        Self::comparison(column, ComparisonOperator::LessThanOrEqual, value)
    }

    /// `column > value`
    pub fn gt<V: ToSqlValue>(column: impl Into<String>, value: V) -> Self {
        Self::comparison(column, ComparisonOperator::GreaterThan, value)
    }

    /// `column >= value`
    pub fn ge<V: ToSqlValue>(column: impl Into<String>, value: V) -> Self {
        Self::comparison(column, ComparisonOperator::GreaterThanOrEqual, value)
    }

    /// Creates a logical node.
    pub fn logical(
        column: impl Into<String>,
        operator: LogicalOperator,
        children: Vec<Self>,
    ) -> Self {
        Self::Logical {
            column: column.into(),
            operator,
            children,
        }
    }

    /// Conjunction of `children`.
    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        Self::logical(String::new(), LogicalOperator::And, children)
    }

    /// Disjunction of `children`.
    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        Self::logical(String::new(), LogicalOperator::Or, children)
    }

    /// Negation of `child`.
    #[must_use]
    pub fn not(child: Self) -> Self {
        Self::logical(String::new(), LogicalOperator::Not, vec![child])
    }

    /// `column IN (values...)`
    pub fn is_in<V: ToSqlValue>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::logical(
            column,
            LogicalOperator::In,
            values.into_iter().map(Self::value).collect(),
        )
    }

    /// `column LIKE pattern`
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::logical(
            column,
            LogicalOperator::Like,
            vec![Self::Value(SqlValue::Text(pattern.into()))],
        )
    }

    /// `column BETWEEN low AND high`
    pub fn between<L: ToSqlValue, H: ToSqlValue>(
        column: impl Into<String>,
        low: L,
        high: H,
    ) -> Self {
        Self::logical(
            column,
            LogicalOperator::Between,
            vec![Self::value(low), Self::value(high)],
        )
    }

    /// A list of columns, for `ORDER BY`.
    pub fn columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self::Columns(columns.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_constructors() {
        assert_eq!(
            Predicate::ge("age", 18),
            Predicate::Comparison {
                column: "age".into(),
                operator: ComparisonOperator::GreaterThanOrEqual,
                value: SqlValue::Int(18),
            }
        );
        assert_eq!(ComparisonOperator::NotEqual.as_sql(), "<>");
    }

    #[test]
    fn test_in_wraps_each_value() {
        let Predicate::Logical {
            column,
            operator,
            children,
        } = Predicate::is_in("id", [1, 2, 3])
        else {
            panic!("expected logical node");
        };
        assert_eq!(column, "id");
        assert_eq!(operator, LogicalOperator::In);
        assert_eq!(
            children,
            vec![
                Predicate::Value(SqlValue::Int(1)),
                Predicate::Value(SqlValue::Int(2)),
                Predicate::Value(SqlValue::Int(3)),
            ]
        );
    }

    #[test]
    fn test_construction_is_permissive() {
        // Structure is only checked at compile time.
        let node = Predicate::logical("not a column", LogicalOperator::Between, vec![]);
        assert!(matches!(node, Predicate::Logical { .. }));
    }
}
