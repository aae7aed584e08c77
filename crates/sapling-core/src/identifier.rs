//! Identifier validation.
//!
//! Table and column names cannot be bound as prepared-statement parameters,
//! so they are concatenated into SQL text. Every such name must pass
//! [`is_safe_name`] first; this check is the only defense against injection
//! through identifiers. Names are rejected, never sanitized.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static SAFE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("safe-name pattern is a valid regex")
});

/// What an identifier names, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// A table name.
    Table,
    /// A column name.
    Column,
    /// A caller-spelled column type name.
    Type,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Column => write!(f, "column"),
            Self::Type => write!(f, "type"),
        }
    }
}

/// Returns whether `name` matches `^[A-Za-z_][A-Za-z0-9_]*$`.
#[must_use]
pub fn is_safe_name(name: &str) -> bool {
    SAFE_NAME.is_match(name)
}

/// Rejects `name` unless it is a safe identifier.
pub fn ensure_safe(kind: IdentifierKind, name: &str) -> Result<()> {
    if is_safe_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_safe_names() {
        for name in ["users", "_private", "User_2", "a", "_", "snake_case_name", "X9"] {
            assert!(is_safe_name(name), "{name} should be safe");
        }
    }

    #[test]
    fn test_rejects_unsafe_names() {
        for name in [
            "",
            "1users",
            "9",
            "users;",
            "users; DROP TABLE users",
            "first name",
            " users",
            "users\n",
            "user-name",
            "\"users\"",
            "users.id",
            "naïve",
        ] {
            assert!(!is_safe_name(name), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_ensure_safe_reports_kind() {
        let err = ensure_safe(IdentifierKind::Column, "bad name").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIdentifier {
                kind: IdentifierKind::Column,
                ref name,
            } if name == "bad name"
        ));
        assert_eq!(err.to_string(), "invalid column name: \"bad name\"");
    }
}
