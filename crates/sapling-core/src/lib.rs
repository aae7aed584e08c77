//! # sapling-core
//!
//! The data-access core of the Sapling ORM.
//!
//! This crate provides:
//! - A query intent AST and predicate tree ([`ast`])
//! - A schema DSL emitting DDL, plus a metadata-only collector ([`schema`])
//! - A statement compiler producing parameterized SQL ([`compiler`])
//! - The [`Database`] backend contract and migration state merge rule
//! - The migration script contract and local catalog ([`migration`])
//!
//! ## SQL Injection Prevention
//!
//! Identifiers are checked against `^[A-Za-z_][A-Za-z0-9_]*$` before they
//! reach SQL text, and values are only ever bound through placeholders:
//!
//! ```rust
//! use sapling_core::ast::{Predicate, QueryIntent};
//! use sapling_core::compiler::{compile, RandomPlaceholders};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let intent = QueryIntent::read("users").filter(Predicate::eq("name", user_input));
//! let stmt = compile(&intent, &RandomPlaceholders)?;
//!
//! assert!(!stmt.sql_text().contains("DROP"));
//! assert!(compile(&QueryIntent::read("users; --"), &RandomPlaceholders).is_err());
//! # Ok::<(), sapling_core::Error>(())
//! ```

pub mod ast;
pub mod compiler;
pub mod database;
pub mod error;
pub mod identifier;
pub mod metadata;
pub mod migration;
pub mod registry;
pub mod schema;
pub mod trace;

pub use ast::{Predicate, QueryIntent, SqlValue, ToSqlValue};
pub use compiler::{compile, PlaceholderSource, PreparedStatement};
pub use database::{merge_migration_state, Database, Location, MigrationRecord, Row};
pub use error::{Error, LedgerConflict, Result};
pub use identifier::{ensure_safe, is_safe_name, IdentifierKind};
pub use metadata::{Metadata, ModelMetadata, SemanticType};
pub use migration::{MigrationCatalog, MigrationScript};
pub use registry::Registry;
pub use schema::{Dialect, MetadataSchema, Schema, TableBuilder};
pub use trace::{TraceEvent, TraceSink, TracingSink};
