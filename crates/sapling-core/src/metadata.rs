//! Structural metadata derived from migration scripts.
//!
//! Metadata is never persisted. It is regenerated on demand by replaying
//! migrations against [`MetadataSchema`](crate::schema::MetadataSchema).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primary key column assumed when no column is flagged primary.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// The type a column's values take in application code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// Text.
    String,
    /// Integer or floating point number.
    Number,
    /// Anything else (blobs, numerics, timestamps).
    Opaque,
}

/// Metadata for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Application-level type.
    pub semantic_type: SemanticType,
    /// Whether the column carries the primary key modifier.
    pub is_primary_key: bool,
    /// Whether the column carries the unique modifier.
    pub is_unique: bool,
}

/// Metadata for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: IndexMap<String, ColumnMetadata>,
    /// Primary key column name.
    pub primary_key: String,
}

impl ModelMetadata {
    /// Builds model metadata, deriving the primary key from the columns.
    pub fn new(name: impl Into<String>, columns: IndexMap<String, ColumnMetadata>) -> Self {
        let primary_key = primary_key_of(&columns);
        Self {
            name: name.into(),
            columns,
            primary_key,
        }
    }

    /// Recomputes `primary_key` after the column set changed.
    pub fn refresh_primary_key(&mut self) {
        self.primary_key = primary_key_of(&self.columns);
    }

    /// Returns the metadata of the primary key column, if it exists.
    #[must_use]
    pub fn primary_key_column(&self) -> Option<&ColumnMetadata> {
        self.columns.get(&self.primary_key)
    }
}

// Composite keys are not supported: the first flagged column wins.
fn primary_key_of(columns: &IndexMap<String, ColumnMetadata>) -> String {
    columns
        .iter()
        .find(|(_, column)| column.is_primary_key)
        .map_or_else(|| DEFAULT_PRIMARY_KEY.to_string(), |(name, _)| name.clone())
}

/// Metadata for every model known to the migrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Models in creation order.
    pub models: Vec<ModelMetadata>,
}

impl Metadata {
    /// Finds a model by table name.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ModelMetadata> {
        self.models.iter().find(|model| model.name == name)
    }

    /// Produces the artifact consumed by typed-binding generators.
    #[must_use]
    pub fn bindings(&self) -> BTreeMap<String, ModelBinding> {
        self.models
            .iter()
            .map(|model| {
                let binding = ModelBinding {
                    primary_key_type: model.primary_key_column().map(|c| c.semantic_type),
                    columns: model
                        .columns
                        .iter()
                        .map(|(name, column)| (name.clone(), column.semantic_type))
                        .collect(),
                };
                (model.name.clone(), binding)
            })
            .collect()
    }
}

/// Typed-binding description of one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBinding {
    /// Type of the primary key, `None` when the key column does not exist.
    pub primary_key_type: Option<SemanticType>,
    /// Column name to type, in declaration order.
    pub columns: IndexMap<String, SemanticType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(semantic_type: SemanticType, is_primary_key: bool) -> ColumnMetadata {
        ColumnMetadata {
            semantic_type,
            is_primary_key,
            is_unique: false,
        }
    }

    #[test]
    fn test_primary_key_defaults_to_id() {
        let mut columns = IndexMap::new();
        columns.insert("name".to_string(), column(SemanticType::String, false));
        let model = ModelMetadata::new("tags", columns);
        assert_eq!(model.primary_key, "id");
        assert!(model.primary_key_column().is_none());
    }

    #[test]
    fn test_bindings() {
        let mut columns = IndexMap::new();
        columns.insert("uuid".to_string(), column(SemanticType::String, true));
        columns.insert("score".to_string(), column(SemanticType::Number, false));
        let metadata = Metadata {
            models: vec![ModelMetadata::new("players", columns)],
        };

        let bindings = metadata.bindings();
        let players = &bindings["players"];
        assert_eq!(players.primary_key_type, Some(SemanticType::String));
        assert_eq!(
            players.columns.keys().collect::<Vec<_>>(),
            vec!["uuid", "score"]
        );

        let json = serde_json::to_value(&bindings).unwrap();
        assert_eq!(json["players"]["columns"]["score"], "number");
    }
}
