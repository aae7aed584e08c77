//! Schema definition DSL.
//!
//! Migration scripts describe tables through the [`Schema`] capability. Two
//! implementations share the interface: a live backend schema that emits
//! DDL, and [`MetadataSchema`], which only records table structure.
//!
//! # Example
//!
//! ```rust
//! use sapling_core::schema::{GenericDialect, MetadataSchema, Schema};
//!
//! # futures::executor::block_on(async {
//! let mut schema = MetadataSchema::new(GenericDialect);
//! schema
//!     .create_table("users", &|t| {
//!         t.increments("id")?;
//!         t.text("email")?.unique()?;
//!         Ok(())
//!     })
//!     .await?;
//!
//! let metadata = schema.into_metadata();
//! assert_eq!(metadata.model("users").unwrap().primary_key, "id");
//! # Ok::<(), sapling_core::Error>(())
//! # }).unwrap();
//! ```

mod collector;
mod column_builder;
mod dialect;
mod table_builder;

use futures::future::BoxFuture;

use crate::error::Result;

pub use collector::MetadataSchema;
pub use column_builder::{
    Collation, ColumnBuilder, ColumnType, DefaultValue, ForeignKeyRef, Modifier, ModifierKind,
};
pub use dialect::{Dialect, GenericDialect};
pub use table_builder::TableBuilder;

/// Body of a `create_table` or `update_table` call.
pub type TableBody<'b> = dyn Fn(&mut TableBuilder) -> Result<()> + Send + Sync + 'b;

/// Schema manipulation capability handed to migration scripts.
///
/// Every table and column name is validated before anything is changed.
pub trait Schema: Send + Sync {
    /// Returns whether `name` exists.
    fn has_table<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool>>;

    /// Creates `name` with the columns declared by `body`.
    fn create_table<'a>(
        &'a mut self,
        name: &'a str,
        body: &'a TableBody<'a>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Adds the columns declared by `body` to the existing table `name`.
    fn update_table<'a>(
        &'a mut self,
        name: &'a str,
        body: &'a TableBody<'a>,
    ) -> BoxFuture<'a, Result<()>>;

    /// Renames `old_name` to `new_name`.
    fn rename_table<'a>(
        &'a mut self,
        old_name: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<()>>;

    /// Drops `name`.
    fn drop_table<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<()>>;
}
