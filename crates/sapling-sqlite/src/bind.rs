//! Binding prepared statements to sqlx queries and decoding rows.
//!
//! sqlx only supports positional `?` parameters for SQLite, so each
//! placeholder fragment is rewritten to `?` and its value, looked up by
//! name, is bound at that position.

use sapling_core::compiler::is_placeholder;
use sapling_core::{Error, PreparedStatement, Result, Row, SqlValue};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, ValueRef};

/// A sqlx SQLite query with positional arguments.
pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Rewrites placeholder fragments to `?` and returns the values in
/// positional order.
pub(crate) fn positional(statement: &PreparedStatement) -> Result<(String, Vec<&SqlValue>)> {
    let mut fragments = Vec::with_capacity(statement.sql.len());
    let mut values = Vec::new();
    for fragment in &statement.sql {
        if is_placeholder(fragment) {
            let value = statement
                .values
                .get(fragment)
                .ok_or_else(|| Error::UnboundPlaceholder(fragment.clone()))?;
            values.push(value);
            fragments.push("?");
        } else {
            fragments.push(fragment.as_str());
        }
    }
    Ok((fragments.join(" "), values))
}

/// Builds a query for `sql` with `values` bound in order.
pub(crate) fn bind_all<'q>(sql: &'q str, values: &[&SqlValue]) -> SqliteQuery<'q> {
    values
        .iter()
        .fold(sqlx::query(sql), |query, value| bind_param(query, value))
}

fn bind_param<'q>(query: SqliteQuery<'q>, value: &SqlValue) -> SqliteQuery<'q> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Blob(b) => query.bind(b.clone()),
    }
}

/// Decodes a row by the storage class of each value.
pub(crate) fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut decoded = Row::with_capacity(row.columns().len());
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index).map_err(Error::driver)?;
        let storage = if raw.is_null() {
            None
        } else {
            Some(raw.type_info().to_string())
        };

        let value = match storage.as_deref() {
            None | Some("NULL") => SqlValue::Null,
            Some("INTEGER") => SqlValue::Int(row.try_get_unchecked(index).map_err(Error::driver)?),
            Some("REAL") => SqlValue::Float(row.try_get_unchecked(index).map_err(Error::driver)?),
            Some("BLOB") => SqlValue::Blob(row.try_get_unchecked(index).map_err(Error::driver)?),
            Some(_) => SqlValue::Text(row.try_get_unchecked(index).map_err(Error::driver)?),
        };
        decoded.insert(column.name().to_string(), value);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use sqlx::sqlite::SqlitePoolOptions;

    fn statement(sql: &[&str], values: &[(&str, SqlValue)]) -> PreparedStatement {
        PreparedStatement {
            sql: sql.iter().map(ToString::to_string).collect(),
            values: values
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect::<IndexMap<_, _>>(),
        }
    }

    #[test]
    fn test_positional_follows_fragment_order() {
        let stmt = statement(
            &["SELECT", "*", "FROM users", "WHERE", "(", "id", "IN", "(", ":p_b", ",", ":p_a", ")", ")"],
            &[(":p_a", SqlValue::Int(1)), (":p_b", SqlValue::Int(2))],
        );
        let (sql, values) = positional(&stmt).unwrap();
        assert_eq!(sql, "SELECT * FROM users WHERE ( id IN ( ? , ? ) )");
        assert_eq!(values, vec![&SqlValue::Int(2), &SqlValue::Int(1)]);
    }

    #[test]
    fn test_unbound_placeholder() {
        let stmt = statement(&["SELECT", "*", "FROM users", "LIMIT", ":p_1"], &[]);
        assert!(matches!(
            positional(&stmt),
            Err(Error::UnboundPlaceholder(ref name)) if name == ":p_1"
        ));
    }

    #[tokio::test]
    async fn test_decode_storage_classes() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let values = [
            &SqlValue::Int(7),
            &SqlValue::Float(1.5),
            &SqlValue::Text("hi".into()),
            &SqlValue::Blob(vec![0, 1]),
            &SqlValue::Null,
        ];
        let row = bind_all("SELECT ? AS i, ? AS f, ? AS t, ? AS b, ? AS n", &values)
            .fetch_one(&pool)
            .await
            .unwrap();
        let decoded = decode_row(&row).unwrap();

        assert_eq!(decoded["i"], SqlValue::Int(7));
        assert_eq!(decoded["f"], SqlValue::Float(1.5));
        assert_eq!(decoded["t"], SqlValue::Text("hi".into()));
        assert_eq!(decoded["b"], SqlValue::Blob(vec![0, 1]));
        assert_eq!(decoded["n"], SqlValue::Null);
        assert_eq!(
            decoded.keys().collect::<Vec<_>>(),
            vec!["i", "f", "t", "b", "n"]
        );
    }
}
