//! Query intent AST and value model.
//!
//! Everything here is side-effect-free data.

mod intent;
mod predicate;
mod value;

pub use intent::{OrderDirection, QueryIntent};
pub use predicate::{ComparisonOperator, LogicalOperator, Predicate};
pub use value::{SqlValue, ToSqlValue};
