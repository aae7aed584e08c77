//! Runtime configuration shared by a backend and its callers.
//!
//! A [`Registry`] is built explicitly and handed to the backend; there is
//! no global instance.

use std::fmt;
use std::sync::Arc;

use convert_case::{Case, Casing};

use crate::compiler::{PlaceholderSource, RandomPlaceholders};
use crate::error::{Error, Result};
use crate::metadata::{Metadata, ModelMetadata};
use crate::trace::{TraceEvent, TraceSink, TracingSink};

/// Flags, trace sinks, placeholder source and loaded metadata.
#[derive(Clone)]
pub struct Registry {
    verbose: bool,
    auto_explain: bool,
    sinks: Vec<Arc<dyn TraceSink>>,
    placeholders: Arc<dyn PlaceholderSource>,
    metadata: Option<Metadata>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates a registry that traces through `tracing` and generates
    /// random placeholder names.
    #[must_use]
    pub fn new() -> Self {
        Self {
            verbose: false,
            auto_explain: false,
            sinks: vec![Arc::new(TracingSink)],
            placeholders: Arc::new(RandomPlaceholders),
            metadata: None,
        }
    }

    /// Sets the verbosity flag.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Explains every query before running it.
    #[must_use]
    pub const fn with_auto_explain(mut self, auto_explain: bool) -> Self {
        self.auto_explain = auto_explain;
        self
    }

    /// Adds a trace sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Removes every trace sink, including the default one.
    #[must_use]
    pub fn without_sinks(mut self) -> Self {
        self.sinks.clear();
        self
    }

    /// Replaces the placeholder source.
    #[must_use]
    pub fn with_placeholders(mut self, placeholders: impl PlaceholderSource + 'static) -> Self {
        self.placeholders = Arc::new(placeholders);
        self
    }

    /// Loads model metadata for lookups.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns the verbosity flag.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Returns the auto-explain flag.
    #[must_use]
    pub const fn auto_explain(&self) -> bool {
        self.auto_explain
    }

    /// Returns the placeholder source.
    #[must_use]
    pub fn placeholders(&self) -> &dyn PlaceholderSource {
        self.placeholders.as_ref()
    }

    /// Returns the loaded metadata, if any.
    #[must_use]
    pub const fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Delivers `event` to every sink.
    pub fn emit(&self, event: &TraceEvent<'_>) {
        for sink in &self.sinks {
            sink.record(event, self.verbose);
        }
    }

    /// Returns the table name of a model type (`BlogPost` -> `blog_post`).
    #[must_use]
    pub fn table_name(model: &str) -> String {
        model.to_case(Case::Snake)
    }

    /// Finds the metadata of a model type by its `PascalCase` name.
    pub fn model(&self, model: &str) -> Result<&ModelMetadata> {
        let metadata = self.metadata.as_ref().ok_or(Error::RegistryNotLoaded)?;
        let wanted = model.to_case(Case::Pascal);
        metadata
            .models
            .iter()
            .find(|m| m.name.to_case(Case::Pascal) == wanted)
            .ok_or_else(|| Error::ModelNotFound(model.to_string()))
    }

    /// Returns the primary key column of a model type.
    pub fn primary_key(&self, model: &str) -> Result<&str> {
        self.model(model).map(|m| m.primary_key.as_str())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("verbose", &self.verbose)
            .field("auto_explain", &self.auto_explain)
            .field("sinks", &self.sinks.len())
            .field("placeholders", &self.placeholders)
            .field("metadata", &self.metadata.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use indexmap::IndexMap;

    use super::*;
    use crate::compiler::{PreparedStatement, SequentialPlaceholders};
    use crate::metadata::{ColumnMetadata, SemanticType};

    #[derive(Default)]
    struct Recorder(Arc<Mutex<Vec<(String, bool)>>>);

    impl TraceSink for Recorder {
        fn record(&self, event: &TraceEvent<'_>, verbose: bool) {
            self.0.lock().unwrap().push((event.name().to_string(), verbose));
        }
    }

    fn blog_metadata() -> Metadata {
        let mut columns = IndexMap::new();
        columns.insert(
            "slug".to_string(),
            ColumnMetadata {
                semantic_type: SemanticType::String,
                is_primary_key: true,
                is_unique: true,
            },
        );
        Metadata {
            models: vec![ModelMetadata::new("blog_post", columns)],
        }
    }

    #[test]
    fn test_table_name() {
        assert_eq!(Registry::table_name("BlogPost"), "blog_post");
        assert_eq!(Registry::table_name("User"), "user");
    }

    #[test]
    fn test_primary_key_lookup() {
        let registry = Registry::new();
        assert!(matches!(
            registry.primary_key("BlogPost"),
            Err(Error::RegistryNotLoaded)
        ));

        let registry = registry.with_metadata(blog_metadata());
        assert_eq!(registry.primary_key("BlogPost").unwrap(), "slug");
        assert!(matches!(
            registry.primary_key("Comment"),
            Err(Error::ModelNotFound(ref name)) if name == "Comment"
        ));
    }

    #[test]
    fn test_emit_reaches_every_sink() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let registry = Registry::new()
            .without_sinks()
            .with_sink(Recorder(Arc::clone(&events)))
            .with_sink(Recorder(Arc::clone(&events)))
            .with_verbose(true)
            .with_placeholders(SequentialPlaceholders::new());

        let statement = PreparedStatement::default();
        registry.emit(&TraceEvent::Plan {
            statement: &statement,
        });

        assert_eq!(
            *events.lock().unwrap(),
            vec![("plan".to_string(), true), ("plan".to_string(), true)]
        );
        assert_eq!(registry.placeholders().next_name(), ":p_1");
    }
}
