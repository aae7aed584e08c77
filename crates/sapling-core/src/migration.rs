//! Migration scripts and the local catalog.
//!
//! Scripts are compiled into the host program and registered by name. The
//! catalog can also take its list of names from a directory, in which case
//! every discovered name must still have a registered script.
//!
//! # Example
//!
//! ```rust
//! use futures::future::BoxFuture;
//! use sapling_core::migration::{MigrationCatalog, MigrationScript};
//! use sapling_core::schema::Schema;
//! use sapling_core::Result;
//!
//! struct CreateUsers;
//!
//! impl MigrationScript for CreateUsers {
//!     fn up<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>> {
//!         Box::pin(async move {
//!             schema
//!                 .create_table("users", &|t| {
//!                     t.increments("id")?;
//!                     t.text("email")?.unique()?;
//!                     Ok(())
//!                 })
//!                 .await
//!         })
//!     }
//!
//!     fn down<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>> {
//!         Box::pin(async move { schema.drop_table("users").await })
//!     }
//! }
//!
//! let catalog = MigrationCatalog::new().register("001_create_users", CreateUsers);
//! assert_eq!(catalog.local_names()?, vec!["001_create_users"]);
//! # Ok::<(), sapling_core::Error>(())
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::schema::Schema;

/// A reversible schema change.
pub trait MigrationScript: Send + Sync {
    /// Applies the change.
    fn up<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>>;

    /// Reverts the change.
    fn down<'a>(&'a self, schema: &'a mut dyn Schema) -> BoxFuture<'a, Result<()>>;
}

/// Named migration scripts known locally.
#[derive(Clone, Default)]
pub struct MigrationCatalog {
    scripts: BTreeMap<String, Arc<dyn MigrationScript>>,
    directory: Option<PathBuf>,
}

impl MigrationCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes migration names from the files in `directory`.
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Registers `script` under `name`, replacing any previous script.
    #[must_use]
    pub fn register(mut self, name: impl Into<String>, script: impl MigrationScript + 'static) -> Self {
        self.scripts.insert(name.into(), Arc::new(script));
        self
    }

    /// Returns the directory names are discovered from, if any.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Lists the locally known migration names, sorted.
    ///
    /// With a directory, these are the stems of its regular files (hidden
    /// files excluded); a missing directory lists nothing. Without one,
    /// they are the registered names.
    pub fn local_names(&self) -> Result<Vec<String>> {
        let Some(directory) = &self.directory else {
            return Ok(self.scripts.keys().cloned().collect());
        };

        let entries = match std::fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !stem.starts_with('.') {
                names.push(stem.to_string());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Loads the script registered under `name`.
    pub fn load(&self, name: &str) -> Result<Arc<dyn MigrationScript>> {
        self.scripts
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingMigrationScript(name.to_string()))
    }
}

impl fmt::Debug for MigrationCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationCatalog")
            .field("scripts", &self.scripts.keys().collect::<Vec<_>>())
            .field("directory", &self.directory)
            .finish()
    }
}
