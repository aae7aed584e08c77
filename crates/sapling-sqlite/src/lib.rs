//! # sapling-sqlite
//!
//! SQLite backend for Sapling, built on `sqlx`.
//!
//! - [`SqliteDatabase`] implements the [`Database`](sapling_core::Database)
//!   contract: migration ledger, metadata replay, and query execution.
//! - [`SqliteSchema`] is the live [`Schema`](sapling_core::Schema) handed to
//!   migration scripts.
//! - [`SqliteDialect`] maps the column type vocabulary to SQLite types.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sapling_core::{Database, MigrationCatalog, Predicate, QueryIntent, Registry};
//! use sapling_sqlite::SqliteDatabase;
//!
//! # async fn run() -> sapling_core::Result<()> {
//! let db = SqliteDatabase::connect("sqlite://app.db", MigrationCatalog::new(), Registry::new())
//!     .await?;
//! db.setup_migration_table().await?;
//!
//! let adults = db
//!     .execute(&QueryIntent::read("users").filter(Predicate::ge("age", 18)))
//!     .await?;
//! println!("{} adults", adults.len());
//! # Ok(())
//! # }
//! ```

mod bind;
mod database;
mod dialect;
mod ledger;
mod schema;

pub use database::SqliteDatabase;
pub use dialect::SqliteDialect;
pub use ledger::LEDGER_TABLE;
pub use schema::SqliteSchema;
