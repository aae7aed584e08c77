//! Placeholder name generation.
//!
//! Names are never derived from user input. A source hands out a fresh
//! `:p_<token>` name on every call.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Prefix shared by every generated placeholder.
pub const PLACEHOLDER_PREFIX: &str = ":p_";

/// Source of placeholder names.
pub trait PlaceholderSource: fmt::Debug + Send + Sync {
    /// Returns a placeholder name that this source has not returned before.
    fn next_name(&self) -> String;
}

/// Random names from UUID v4 tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPlaceholders;

impl PlaceholderSource for RandomPlaceholders {
    fn next_name(&self) -> String {
        format!("{PLACEHOLDER_PREFIX}{}", Uuid::new_v4().simple())
    }
}

/// Counter-based names (`:p_1`, `:p_2`, ...), for reproducible output.
#[derive(Debug, Default)]
pub struct SequentialPlaceholders {
    next: AtomicU64,
}

impl SequentialPlaceholders {
    /// Creates a source starting at `:p_1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }
}

impl PlaceholderSource for SequentialPlaceholders {
    fn next_name(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{PLACEHOLDER_PREFIX}{n}")
    }
}

/// Returns whether `fragment` has the shape of a generated placeholder.
#[must_use]
pub fn is_placeholder(fragment: &str) -> bool {
    fragment
        .strip_prefix(PLACEHOLDER_PREFIX)
        .is_some_and(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_alphanumeric()))
}
