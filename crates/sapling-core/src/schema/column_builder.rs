//! Column definition builder.
//!
//! A column is a validated name, a [`ColumnType`] and a set of modifiers
//! keyed by [`ModifierKind`]. Each kind may be set once; setting it again is
//! a [`DuplicateModifier`](Error::DuplicateModifier) error. Columns start out
//! NOT NULL and [`ColumnBuilder::nullable`] removes that modifier.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::identifier::{ensure_safe, IdentifierKind};
use crate::metadata::{ColumnMetadata, SemanticType};

/// Column type vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Integer.
    Integer,
    /// Text.
    Text,
    /// Floating point.
    Real,
    /// Binary large object.
    Blob,
    /// Numeric affinity.
    Numeric,
    /// Date and time.
    Timestamp,
    /// A caller-spelled type outside the vocabulary.
    Named(String),
}

impl ColumnType {
    /// Parses a caller-spelled type name.
    ///
    /// Names from the vocabulary are matched case-insensitively. Any other
    /// safe name becomes [`ColumnType::Named`] and is left for the backend
    /// dialect to accept or reject.
    pub fn parse(type_name: &str) -> Result<Self> {
        ensure_safe(IdentifierKind::Type, type_name)?;
        let parsed = match type_name.to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => Self::Integer,
            "TEXT" => Self::Text,
            "REAL" => Self::Real,
            "BLOB" => Self::Blob,
            "NUMERIC" => Self::Numeric,
            "TIMESTAMP" | "DATETIME" => Self::Timestamp,
            _ => Self::Named(type_name.to_string()),
        };
        Ok(parsed)
    }

    /// Returns the application-level type of values in this column.
    #[must_use]
    pub const fn semantic_type(&self) -> SemanticType {
        match self {
            Self::Integer | Self::Real => SemanticType::Number,
            Self::Text => SemanticType::String,
            Self::Blob | Self::Numeric | Self::Timestamp | Self::Named(_) => SemanticType::Opaque,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::Text => write!(f, "TEXT"),
            Self::Real => write!(f, "REAL"),
            Self::Blob => write!(f, "BLOB"),
            Self::Numeric => write!(f, "NUMERIC"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Key of the modifier map. The declaration order is the DDL order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModifierKind {
    /// `PRIMARY KEY`
    PrimaryKey,
    /// `AUTOINCREMENT`
    AutoIncrement,
    /// `NOT NULL`
    NotNull,
    /// `UNIQUE`
    Unique,
    /// `DEFAULT ...`
    Default,
    /// `COLLATE ...`
    Collation,
    /// `REFERENCES table(column)`
    References,
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PrimaryKey => "primary_key",
            Self::AutoIncrement => "autoincrement",
            Self::NotNull => "not_null",
            Self::Unique => "unique",
            Self::Default => "default",
            Self::Collation => "collation",
            Self::References => "references",
        };
        f.write_str(name)
    }
}

/// Default value of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default, quoted on output.
    String(String),
    /// The time of insertion.
    CurrentTimestamp,
}

impl DefaultValue {
    /// Returns the SQL representation of the default value.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Boolean(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::String(s) => format!("'{}'", s.replace('\'', "''")),
            Self::CurrentTimestamp => String::from("CURRENT_TIMESTAMP"),
        }
    }
}

/// Text collating sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collation {
    /// Byte-wise comparison.
    Binary,
    /// ASCII case-insensitive comparison.
    NoCase,
    /// Comparison ignoring trailing spaces.
    RTrim,
}

impl Collation {
    /// Returns the SQL name of the collation.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Binary => "BINARY",
            Self::NoCase => "NOCASE",
            Self::RTrim => "RTRIM",
        }
    }
}

/// A reference to a column in another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    /// Referenced table name.
    pub table: String,
    /// Referenced column name.
    pub column: String,
}

/// A column modifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Modifier {
    /// Primary key.
    PrimaryKey,
    /// Auto-increment.
    AutoIncrement,
    /// Not nullable.
    NotNull,
    /// Unique.
    Unique,
    /// Default value.
    Default(DefaultValue),
    /// Collating sequence.
    Collation(Collation),
    /// Foreign key reference.
    References(ForeignKeyRef),
}

impl Modifier {
    /// Returns the map key of this modifier.
    #[must_use]
    pub const fn kind(&self) -> ModifierKind {
        match self {
            Self::PrimaryKey => ModifierKind::PrimaryKey,
            Self::AutoIncrement => ModifierKind::AutoIncrement,
            Self::NotNull => ModifierKind::NotNull,
            Self::Unique => ModifierKind::Unique,
            Self::Default(_) => ModifierKind::Default,
            Self::Collation(_) => ModifierKind::Collation,
            Self::References(_) => ModifierKind::References,
        }
    }

    /// Returns the DDL text of this modifier.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::PrimaryKey => String::from("PRIMARY KEY"),
            Self::AutoIncrement => String::from("AUTOINCREMENT"),
            Self::NotNull => String::from("NOT NULL"),
            Self::Unique => String::from("UNIQUE"),
            Self::Default(value) => format!("DEFAULT {}", value.to_sql()),
            Self::Collation(collation) => format!("COLLATE {}", collation.as_sql()),
            Self::References(fk) => format!("REFERENCES {}({})", fk.table, fk.column),
        }
    }
}

/// Builder for one column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBuilder {
    name: String,
    column_type: ColumnType,
    modifiers: BTreeMap<ModifierKind, Modifier>,
}

impl ColumnBuilder {
    /// Creates a NOT NULL column, rejecting unsafe names.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Result<Self> {
        let name = name.into();
        ensure_safe(IdentifierKind::Column, &name)?;
        let mut modifiers = BTreeMap::new();
        modifiers.insert(ModifierKind::NotNull, Modifier::NotNull);
        Ok(Self {
            name,
            column_type,
            modifiers,
        })
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the column type.
    #[must_use]
    pub const fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    /// Returns whether a modifier of `kind` is set.
    #[must_use]
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        self.modifiers.contains_key(&kind)
    }

    /// Returns the modifier of `kind`, if set.
    #[must_use]
    pub fn modifier(&self, kind: ModifierKind) -> Option<&Modifier> {
        self.modifiers.get(&kind)
    }

    /// Returns the modifiers in DDL order.
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.values()
    }

    /// Adds a modifier, failing if its kind is already set.
    pub fn add_modifier(&mut self, modifier: Modifier) -> Result<&mut Self> {
        let kind = modifier.kind();
        if self.modifiers.contains_key(&kind) {
            return Err(Error::DuplicateModifier {
                column: self.name.clone(),
                modifier: kind,
            });
        }
        self.modifiers.insert(kind, modifier);
        Ok(self)
    }

    /// Allows NULL values.
    pub fn nullable(&mut self) -> &mut Self {
        self.modifiers.remove(&ModifierKind::NotNull);
        self
    }

    /// Marks the column as PRIMARY KEY.
    pub fn primary(&mut self) -> Result<&mut Self> {
        self.add_modifier(Modifier::PrimaryKey)
    }

    /// Marks the column as AUTOINCREMENT.
    pub fn autoincrement(&mut self) -> Result<&mut Self> {
        self.add_modifier(Modifier::AutoIncrement)
    }

    /// Marks the column as UNIQUE.
    pub fn unique(&mut self) -> Result<&mut Self> {
        self.add_modifier(Modifier::Unique)
    }

    /// Sets the default value.
    pub fn default(&mut self, value: DefaultValue) -> Result<&mut Self> {
        self.add_modifier(Modifier::Default(value))
    }

    /// Sets a NULL default value.
    pub fn default_null(&mut self) -> Result<&mut Self> {
        self.default(DefaultValue::Null)
    }

    /// Sets a boolean default value.
    pub fn default_bool(&mut self, value: bool) -> Result<&mut Self> {
        self.default(DefaultValue::Boolean(value))
    }

    /// Sets an integer default value.
    pub fn default_int(&mut self, value: i64) -> Result<&mut Self> {
        self.default(DefaultValue::Integer(value))
    }

    /// Sets a float default value.
    pub fn default_float(&mut self, value: f64) -> Result<&mut Self> {
        self.default(DefaultValue::Float(value))
    }

    /// Sets a string default value.
    pub fn default_str(&mut self, value: impl Into<String>) -> Result<&mut Self> {
        self.default(DefaultValue::String(value.into()))
    }

    /// Defaults to the time of insertion.
    pub fn default_now(&mut self) -> Result<&mut Self> {
        self.default(DefaultValue::CurrentTimestamp)
    }

    /// Sets the collating sequence.
    pub fn collation(&mut self, collation: Collation) -> Result<&mut Self> {
        self.add_modifier(Modifier::Collation(collation))
    }

    /// Adds a foreign key reference to `table(column)`.
    pub fn references(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
    ) -> Result<&mut Self> {
        let table = table.into();
        let column = column.into();
        ensure_safe(IdentifierKind::Table, &table)?;
        ensure_safe(IdentifierKind::Column, &column)?;
        self.add_modifier(Modifier::References(ForeignKeyRef { table, column }))
    }

    /// Returns the metadata of this column.
    #[must_use]
    pub fn to_metadata(&self) -> ColumnMetadata {
        ColumnMetadata {
            semantic_type: self.column_type.semantic_type(),
            is_primary_key: self.has_modifier(ModifierKind::PrimaryKey),
            is_unique: self.has_modifier(ModifierKind::Unique),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_start_not_null() {
        let column = ColumnBuilder::new("email", ColumnType::Text).unwrap();
        assert!(column.has_modifier(ModifierKind::NotNull));
    }

    #[test]
    fn test_nullable_removes_not_null() {
        let mut column = ColumnBuilder::new("bio", ColumnType::Text).unwrap();
        column.nullable();
        assert!(!column.has_modifier(ModifierKind::NotNull));
        // Removing twice is harmless.
        column.nullable();
        assert_eq!(column.modifiers().count(), 0);
    }

    #[test]
    fn test_duplicate_modifier_rejected() {
        let mut column = ColumnBuilder::new("email", ColumnType::Text).unwrap();
        column.unique().unwrap();
        let err = column.unique().unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateModifier {
                modifier: ModifierKind::Unique,
                ..
            }
        ));

        column.default_str("x").unwrap();
        assert!(column.default_int(1).is_err());
    }

    #[test]
    fn test_invalid_column_name_rejected() {
        let err = ColumnBuilder::new("email; DROP TABLE users", ColumnType::Text).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIdentifier {
                kind: IdentifierKind::Column,
                ..
            }
        ));
    }

    #[test]
    fn test_references_validates_target() {
        let mut column = ColumnBuilder::new("author_id", ColumnType::Integer).unwrap();
        assert!(column.references("users(id); --", "id").is_err());
        assert!(!column.has_modifier(ModifierKind::References));
        column.references("users", "id").unwrap();
        assert!(column.has_modifier(ModifierKind::References));
    }

    #[test]
    fn test_modifier_sql() {
        assert_eq!(
            Modifier::Default(DefaultValue::String("it's".into())).to_sql(),
            "DEFAULT 'it''s'"
        );
        assert_eq!(
            Modifier::Collation(Collation::NoCase).to_sql(),
            "COLLATE NOCASE"
        );
        assert_eq!(
            Modifier::References(ForeignKeyRef {
                table: "users".into(),
                column: "id".into(),
            })
            .to_sql(),
            "REFERENCES users(id)"
        );
    }

    #[test]
    fn test_parse_column_type() {
        assert_eq!(ColumnType::parse("integer").unwrap(), ColumnType::Integer);
        assert_eq!(ColumnType::parse("DateTime").unwrap(), ColumnType::Timestamp);
        assert_eq!(
            ColumnType::parse("VARCHAR").unwrap(),
            ColumnType::Named("VARCHAR".into())
        );
        assert!(ColumnType::parse("VARCHAR(255)").is_err());
    }

    #[test]
    fn test_metadata_flags() {
        let mut column = ColumnBuilder::new("id", ColumnType::Integer).unwrap();
        column.primary().unwrap();
        let meta = column.to_metadata();
        assert!(meta.is_primary_key);
        assert!(!meta.is_unique);
        assert_eq!(meta.semantic_type, SemanticType::Number);
    }
}
