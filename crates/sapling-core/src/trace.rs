//! Trace events emitted by backends.

use serde::Serialize;
use tracing::{debug, info};

use crate::compiler::PreparedStatement;

/// Something a backend did.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TraceEvent<'a> {
    /// A statement was compiled.
    Plan {
        /// The compiled statement.
        statement: &'a PreparedStatement,
    },
    /// A statement was run.
    Execute {
        /// The statement.
        statement: &'a PreparedStatement,
        /// Number of rows fetched.
        rows: usize,
    },
    /// The engine's plan for a statement was fetched.
    Explain {
        /// The statement.
        statement: &'a PreparedStatement,
        /// Plan rows, one JSON object per line.
        plan: &'a str,
    },
    /// A DDL statement or ledger write completed.
    Mutation {
        /// Statement text.
        sql: &'a str,
        /// Rows affected as reported by the engine.
        rows_affected: u64,
    },
}

impl TraceEvent<'_> {
    /// Returns the event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Plan { .. } => "plan",
            Self::Execute { .. } => "execute",
            Self::Explain { .. } => "explain",
            Self::Mutation { .. } => "mutation",
        }
    }
}

/// Receiver of trace events.
pub trait TraceSink: Send + Sync {
    /// Handles one event. `verbose` is the registry's verbosity flag.
    fn record(&self, event: &TraceEvent<'_>, verbose: bool);
}

/// Forwards events to `tracing`: `info` when verbose, `debug` otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: &TraceEvent<'_>, verbose: bool) {
        match event {
            TraceEvent::Plan { statement } => {
                let sql = statement.sql_text();
                if verbose {
                    info!(sql = %sql, values = statement.values.len(), "plan");
                } else {
                    debug!(sql = %sql, values = statement.values.len(), "plan");
                }
            }
            TraceEvent::Execute { statement, rows } => {
                let sql = statement.sql_text();
                if verbose {
                    info!(sql = %sql, rows, "execute");
                } else {
                    debug!(sql = %sql, rows, "execute");
                }
            }
            TraceEvent::Explain { statement, plan } => {
                let sql = statement.sql_text();
                if verbose {
                    info!(sql = %sql, plan = %plan, "explain");
                } else {
                    debug!(sql = %sql, plan = %plan, "explain");
                }
            }
            TraceEvent::Mutation { sql, rows_affected } => {
                if verbose {
                    info!(sql = %sql, rows_affected, "mutation");
                } else {
                    debug!(sql = %sql, rows_affected, "mutation");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let statement = PreparedStatement {
            sql: vec!["SELECT".into(), "*".into(), "FROM users".into()],
            values: indexmap::IndexMap::new(),
        };
        let event = TraceEvent::Execute {
            statement: &statement,
            rows: 3,
        };
        assert_eq!(event.name(), "execute");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "execute");
        assert_eq!(json["rows"], 3);
        assert_eq!(json["statement"]["sql"][2], "FROM users");
    }
}
