//! Error types shared by every Sapling backend.

use std::fmt;

use crate::ast::LogicalOperator;
use crate::identifier::IdentifierKind;
use crate::schema::ModifierKind;

/// Boxed driver error, kept verbatim.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why the migration ledger could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerConflict {
    /// The ledger table was asked to be created but already exists.
    AlreadyExists,
    /// The ledger table is required but does not exist.
    Missing,
}

impl fmt::Display for LedgerConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already exists"),
            Self::Missing => write!(f, "does not exist"),
        }
    }
}

/// Errors raised by the schema DSL, the statement compiler, the migration
/// catalog and the backends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A table, column or type name failed the safe-name pattern.
    #[error("invalid {kind} name: {name:?}")]
    InvalidIdentifier {
        /// What the name was used for.
        kind: IdentifierKind,
        /// The rejected name.
        name: String,
    },

    /// A column was declared twice on the same table builder.
    #[error("column {column} already added to table {table}")]
    DuplicateColumn {
        /// Table being built.
        table: String,
        /// The repeated column.
        column: String,
    },

    /// A modifier kind was set twice on the same column builder.
    #[error("modifier {modifier} already set on column {column}")]
    DuplicateModifier {
        /// Column being built.
        column: String,
        /// The repeated modifier kind.
        modifier: ModifierKind,
    },

    /// A table was created twice in the metadata collector.
    #[error("table {0} already exists")]
    DuplicateTable(String),

    /// A table was created without any column.
    #[error("table {0} must declare at least one column")]
    EmptyTable(String),

    /// The dialect cannot add a column carrying this modifier to an
    /// existing table.
    #[error("{dialect} cannot add column {column} with {modifier} to existing table {table}")]
    UnsupportedAddColumn {
        /// Dialect that rejected the column.
        dialect: &'static str,
        /// Table being altered.
        table: String,
        /// The rejected column.
        column: String,
        /// The offending modifier.
        modifier: ModifierKind,
    },

    /// A table operation named a table that does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The backend dialect cannot store the requested column type.
    #[error("unsupported column type for {dialect}: {type_name}")]
    UnsupportedColumnType {
        /// Dialect that rejected the type.
        dialect: &'static str,
        /// The type as spelled by the caller.
        type_name: String,
    },

    /// The predicate compiler does not implement this operator.
    #[error("logical operator {0} is not yet supported")]
    UnsupportedOperator(LogicalOperator),

    /// A predicate node has the wrong shape for its operator.
    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    /// A placeholder fragment has no bound value.
    #[error("placeholder {0} has no bound value")]
    UnboundPlaceholder(String),

    /// A migration named by the caller has no registered script.
    #[error("migration script not found: {0}")]
    MissingMigrationScript(String),

    /// The ledger table is in the wrong state for the requested operation.
    #[error("migration table {table:?} {conflict}")]
    LedgerStateConflict {
        /// Ledger table name.
        table: &'static str,
        /// What went wrong.
        conflict: LedgerConflict,
    },

    /// A ledger row carries a name or timestamp that cannot be read back.
    #[error("migration ledger row {name} is unreadable: {value:?}")]
    CorruptLedger {
        /// Migration name of the row, or `<name>` when the name itself is
        /// unreadable.
        name: String,
        /// Raw stored value.
        value: String,
    },

    /// The registry has no metadata for this model.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// A registry lookup was attempted before metadata was loaded.
    #[error("registry metadata has not been loaded")]
    RegistryNotLoaded,

    /// IO error while listing migration scripts.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the underlying relational engine.
    #[error("driver error: {0}")]
    Driver(#[source] DriverError),
}

impl Error {
    /// Wraps an engine error without interpreting it.
    pub fn driver(err: impl Into<DriverError>) -> Self {
        Self::Driver(err.into())
    }
}

/// Result type for Sapling operations.
pub type Result<T> = std::result::Result<T, Error>;
