//! # sapling-migrate
//!
//! Reconciles local migration scripts with a backend's ledger.
//!
//! - [`Migrator`] applies pending migrations, rolls back applied ones, or
//!   both, strictly in name order.
//! - [`cli`] is a `clap` front-end for host binaries that compile their
//!   migration scripts in.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sapling_core::{MigrationCatalog, Registry};
//! use sapling_migrate::Migrator;
//! use sapling_sqlite::SqliteDatabase;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let db = SqliteDatabase::connect("sqlite://app.db", MigrationCatalog::new(), Registry::new())
//!     .await?;
//! let applied = Migrator::new(&db).migrate().await?;
//! println!("applied {applied:?}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod reconciler;

pub use cli::{Cli, Command};
pub use error::{Direction, MigrateError, Result};
pub use reconciler::Migrator;
