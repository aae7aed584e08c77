//! Metadata-only schema.
//!
//! [`MetadataSchema`] answers the same [`Schema`] calls as a live backend
//! but only records the resulting table structure. Replaying every `up`
//! procedure against it yields the [`Metadata`] of the final schema.

use std::fmt;

use futures::future::{self, BoxFuture};

use super::dialect::Dialect;
use super::table_builder::TableBuilder;
use super::{Schema, TableBody};
use crate::error::{Error, Result};
use crate::identifier::{ensure_safe, IdentifierKind};
use crate::metadata::{Metadata, ModelMetadata};

/// In-memory collector of [`ModelMetadata`].
///
/// Every table is checked against `D` the way the live backend checks it
/// before issuing DDL: column types, empty tables, columns that cannot be
/// added to an existing table, and columns that already exist.
pub struct MetadataSchema<D> {
    dialect: D,
    models: Vec<ModelMetadata>,
}

impl<D: Dialect> MetadataSchema<D> {
    /// Creates an empty collector.
    pub const fn new(dialect: D) -> Self {
        Self {
            dialect,
            models: Vec::new(),
        }
    }

    /// Returns the models collected so far, in creation order.
    pub fn models(&self) -> &[ModelMetadata] {
        &self.models
    }

    /// Consumes the collector.
    pub fn into_metadata(self) -> Metadata {
        Metadata {
            models: self.models,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.models.iter().position(|model| model.name == name)
    }

    fn build(name: &str, body: &TableBody<'_>) -> Result<TableBuilder> {
        let mut table = TableBuilder::new(name)?;
        body(&mut table)?;
        Ok(table)
    }

    fn create(&mut self, name: &str, body: &TableBody<'_>) -> Result<()> {
        let table = Self::build(name, body)?;
        table.check_create(&self.dialect)?;
        if self.position(name).is_some() {
            return Err(Error::DuplicateTable(name.to_string()));
        }
        self.models.push(table.to_metadata());
        Ok(())
    }

    fn update(&mut self, name: &str, body: &TableBody<'_>) -> Result<()> {
        let table = Self::build(name, body)?;
        table.check_update(&self.dialect)?;
        let index = self
            .position(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        let model = &mut self.models[index];

        let added = table.to_metadata();
        if let Some(column) = added.columns.keys().find(|c| model.columns.contains_key(*c)) {
            return Err(Error::DuplicateColumn {
                table: name.to_string(),
                column: column.clone(),
            });
        }
        model.columns.extend(added.columns);
        model.refresh_primary_key();
        Ok(())
    }

    fn rename(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        ensure_safe(IdentifierKind::Table, old_name)?;
        ensure_safe(IdentifierKind::Table, new_name)?;
        let index = self
            .position(old_name)
            .ok_or_else(|| Error::TableNotFound(old_name.to_string()))?;
        if self.position(new_name).is_some() {
            return Err(Error::DuplicateTable(new_name.to_string()));
        }
        self.models[index].name = new_name.to_string();
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        ensure_safe(IdentifierKind::Table, name)?;
        let index = self
            .position(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        self.models.remove(index);
        Ok(())
    }
}

impl<D: Dialect> Schema for MetadataSchema<D> {
    fn has_table<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<bool>> {
        let result = ensure_safe(IdentifierKind::Table, name).map(|()| self.position(name).is_some());
        Box::pin(future::ready(result))
    }

    fn create_table<'a>(
        &'a mut self,
        name: &'a str,
        body: &'a TableBody<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(future::ready(self.create(name, body)))
    }

    fn update_table<'a>(
        &'a mut self,
        name: &'a str,
        body: &'a TableBody<'a>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(future::ready(self.update(name, body)))
    }

    fn rename_table<'a>(
        &'a mut self,
        old_name: &'a str,
        new_name: &'a str,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(future::ready(self.rename(old_name, new_name)))
    }

    fn drop_table<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(future::ready(self.remove(name)))
    }
}

impl<D: Dialect> fmt::Debug for MetadataSchema<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataSchema")
            .field("dialect", &self.dialect.name())
            .field("models", &self.models)
            .finish()
    }
}
