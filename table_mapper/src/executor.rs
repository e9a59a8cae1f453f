//! Statement execution
//!
//! [`QueryExecutor`] is the seam between mappers and the database. Row
//! returning statements deliver every row as one JSON document, which is
//! decoded straight into a [`Row`].

use crate::errors::MapperError;
use crate::Row;
use async_trait::async_trait;
use serde_json::Value;
use sql_builder::{debug_log, BoundQuery};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgTypeInfo};
use sqlx::query::{Query, QueryScalar};
use sqlx::types::Json;
use sqlx::{Encode, PgPool, Postgres, Type};

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run a row-returning statement
    async fn fetch_rows(&self, query: &BoundQuery) -> Result<Vec<Row>, MapperError>;

    /// Run a statement for its side effect, returning the affected-row count
    async fn execute(&self, query: &BoundQuery) -> Result<u64, MapperError>;
}

/// NULL sent without a parameter type, so the server infers one from where
/// the parameter appears
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

/// Bind a JSON value for a column of the given declared type
///
/// Declared columns receive text (jsonb for JSON columns) and the SQL casts
/// it. Undeclared values bind by JSON kind with one PostgreSQL type per kind:
/// strings as text, integers as int8, other numbers as float8.
macro_rules! bind_json_param {
    ($query:expr, $param:expr, $column_type:expr) => {
        match ($param, $column_type) {
            (Value::Null, Some(_)) => $query.bind(Option::<String>::None),
            (Value::Null, None) => $query.bind(UntypedNull),
            (value, Some(column_type)) if column_type.is_json() => $query.bind(Json(value)),
            (Value::String(s), Some(_)) => $query.bind(s),
            (value, Some(_)) => $query.bind(value.to_string()),
            (Value::String(s), None) => $query.bind(s),
            (Value::Number(n), None) => {
                if let Some(i) = n.as_i64() {
                    $query.bind(i)
                } else if let Some(f) = n.as_f64() {
                    $query.bind(f)
                } else {
                    $query.bind(n.to_string())
                }
            }
            (Value::Bool(b), None) => $query.bind(b),
            (other, None) => $query.bind(Json(other)),
        }
    };
}

/// An untyped null takes its type from the statement it is prepared with,
/// so such executions must not share a cached prepared statement
fn has_untyped_null(query: &BoundQuery) -> bool {
    query
        .typed_values()
        .any(|(value, column_type)| value.is_null() && column_type.is_none())
}

pub(crate) fn bind_statement(query: &BoundQuery) -> Query<'_, Postgres, PgArguments> {
    let mut statement = sqlx::query(query.sql()).persistent(!has_untyped_null(query));
    for (value, column_type) in query.typed_values() {
        statement = bind_json_param!(statement, value.clone(), column_type);
    }
    statement
}

pub(crate) fn bind_row_statement(
    query: &BoundQuery,
) -> QueryScalar<'_, Postgres, Json<Row>, PgArguments> {
    let mut statement = sqlx::query_scalar::<Postgres, Json<Row>>(query.sql())
        .persistent(!has_untyped_null(query));
    for (value, column_type) in query.typed_values() {
        statement = bind_json_param!(statement, value.clone(), column_type);
    }
    statement
}

#[async_trait]
impl QueryExecutor for PgPool {
    async fn fetch_rows(&self, query: &BoundQuery) -> Result<Vec<Row>, MapperError> {
        debug_log!("[FETCH] SQL: {}", query.sql());
        debug_log!("[FETCH] params count: {}", query.values().len());

        let rows = bind_row_statement(query)
            .fetch_all(self)
            .await?;
        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }

    async fn execute(&self, query: &BoundQuery) -> Result<u64, MapperError> {
        debug_log!("[EXECUTE] SQL: {}", query.sql());
        debug_log!("[EXECUTE] params count: {}", query.values().len());

        let result = bind_statement(query)
            .execute(self)
            .await?;
        Ok(result.rows_affected())
    }
}
