//! Positional parameter binding and row decoding per backend.

use sqlx::mysql::{MySql, MySqlArguments};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

use crate::domain::{Row, Value};
use crate::error::ExecutionError;

pub(super) fn mysql<'q>(sql: &'q str, params: &'q [Value]) -> Query<'q, MySql, MySqlArguments> {
    params
        .iter()
        .fold(sqlx::query::<MySql>(sql), |query, value| match value {
            Value::Null => query.bind(None::<i64>),
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
        })
}

pub(super) fn sqlite<'q>(
    sql: &'q str,
    params: &'q [Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    params
        .iter()
        .fold(sqlx::query::<Sqlite>(sql), |query, value| match value {
            Value::Null => query.bind(None::<i64>),
            Value::Int(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.as_str()),
        })
}

/// Decode every column as an integer, falling back to text.
pub(super) fn decode_row<R>(row: &R) -> Result<Row, ExecutionError>
where
    R: sqlx::Row,
    usize: sqlx::ColumnIndex<R>,
    for<'r> Option<i64>: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    for<'r> Option<String>: sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
{
    (0..row.len())
        .map(|index| {
            if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
                return Ok(value.map_or(Value::Null, Value::Int));
            }
            row.try_get::<Option<String>, _>(index)
                .map(|value| value.map_or(Value::Null, Value::Text))
                .map_err(ExecutionError::from)
        })
        .collect()
}
