//! Predicate tree compilation.

use super::StatementWriter;
use crate::ast::{LogicalOperator, Predicate, SqlValue};
use crate::error::{Error, Result};
use crate::identifier::{ensure_safe, IdentifierKind};

/// Where a predicate appears; only `ORDER BY` accepts a column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Position {
    Filter,
    Order,
}

impl StatementWriter<'_> {
    pub(super) fn push_predicate(&mut self, node: &Predicate, position: Position) -> Result<()> {
        match node {
            Predicate::Value(value) => {
                self.push_value(value.clone());
                Ok(())
            }
            Predicate::Comparison {
                column,
                operator,
                value,
            } => {
                self.push_column(column)?;
                self.push(operator.as_sql());
                self.push_value(value.clone());
                Ok(())
            }
            Predicate::Logical {
                column,
                operator,
                children,
            } => self.push_logical(column, *operator, children),
            Predicate::Columns(columns) => {
                if position != Position::Order {
                    return Err(Error::InvalidPredicate(
                        "column lists are only allowed in ORDER BY".to_string(),
                    ));
                }
                if columns.is_empty() {
                    return Err(Error::InvalidPredicate(
                        "ORDER BY needs at least one column".to_string(),
                    ));
                }
                self.push_column_list(columns)
            }
        }
    }

    fn push_logical(
        &mut self,
        column: &str,
        operator: LogicalOperator,
        children: &[Predicate],
    ) -> Result<()> {
        match operator {
            LogicalOperator::And | LogicalOperator::Or => {
                if children.is_empty() {
                    return Err(Error::InvalidPredicate(format!(
                        "{operator} needs at least one child"
                    )));
                }
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        self.push(operator.as_sql());
                    }
                    self.push_group(child)?;
                }
                Ok(())
            }
            LogicalOperator::Not => {
                let [child] = children else {
                    return Err(arity(operator, "exactly one child", children.len()));
                };
                self.push(operator.as_sql());
                self.push_group(child)
            }
            LogicalOperator::In => {
                if children.is_empty() {
                    return Err(arity(operator, "at least one value", 0));
                }
                let values = values_of(operator, children)?;
                self.push_column(column)?;
                self.push(operator.as_sql());
                self.push("(");
                for (i, value) in values.into_iter().enumerate() {
                    if i > 0 {
                        self.push(",");
                    }
                    self.push_value(value.clone());
                }
                self.push(")");
                Ok(())
            }
            LogicalOperator::Like => {
                let values = values_of(operator, children)?;
                let [pattern] = values.as_slice() else {
                    return Err(arity(operator, "exactly one value", children.len()));
                };
                self.push_column(column)?;
                self.push(operator.as_sql());
                self.push_value((*pattern).clone());
                Ok(())
            }
            LogicalOperator::Between => {
                let values = values_of(operator, children)?;
                let [low, high] = values.as_slice() else {
                    return Err(arity(operator, "exactly two values", children.len()));
                };
                self.push_column(column)?;
                self.push(operator.as_sql());
                self.push_value((*low).clone());
                self.push("AND");
                self.push_value((*high).clone());
                Ok(())
            }
            LogicalOperator::Exists
            | LogicalOperator::Any
            | LogicalOperator::All
            | LogicalOperator::Some => Err(Error::UnsupportedOperator(operator)),
        }
    }

    fn push_group(&mut self, child: &Predicate) -> Result<()> {
        self.push("(");
        self.push_predicate(child, Position::Filter)?;
        self.push(")");
        Ok(())
    }

    fn push_column(&mut self, column: &str) -> Result<()> {
        ensure_safe(IdentifierKind::Column, column)?;
        self.push(column);
        Ok(())
    }
}

fn values_of(operator: LogicalOperator, children: &[Predicate]) -> Result<Vec<&SqlValue>> {
    children
        .iter()
        .map(|child| match child {
            Predicate::Value(value) => Ok(value),
            _ => Err(Error::InvalidPredicate(format!(
                "{operator} only accepts value children"
            ))),
        })
        .collect()
}

fn arity(operator: LogicalOperator, expected: &str, got: usize) -> Error {
    Error::InvalidPredicate(format!("{operator} needs {expected}, got {got}"))
}
