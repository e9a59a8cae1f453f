//! Filter compilation
//!
//! A [`MapperFilter`] names the rows a query acts on. [`compile_filter`]
//! turns it into the WHERE conditions of the underlying statement.

use crate::binding::TableBinding;
use crate::errors::MapperError;
use crate::Row;
use serde_json::Value;
use sql_builder::{Expr, Parameter, Placeholder, QueryOperator};
use std::fmt;
use std::sync::Arc;

pub type FilterCallback = Arc<dyn Fn(&ExpressionBuilder) -> Expr + Send + Sync>;

#[derive(Clone)]
pub enum MapperFilter {
    /// Every row
    All,
    /// Equality on the single key column
    Key(Value),
    /// Positional equality across all key columns
    KeyTuple(Vec<Value>),
    /// Equality per field; a list value becomes membership
    Fields(Row),
    /// `column <op> value` with the operator in its SQL spelling
    Binary {
        column: String,
        op: String,
        value: Parameter,
    },
    Expr(Expr),
    Callback(FilterCallback),
}

impl MapperFilter {
    pub fn key(value: impl Into<Value>) -> Self {
        MapperFilter::Key(value.into())
    }

    pub fn tuple(values: Vec<Value>) -> Self {
        MapperFilter::KeyTuple(values)
    }

    pub fn fields(fields: Row) -> Self {
        MapperFilter::Fields(fields)
    }

    pub fn binary(column: impl Into<String>, op: impl Into<String>, value: impl Into<Parameter>) -> Self {
        MapperFilter::Binary {
            column: column.into(),
            op: op.into(),
            value: value.into(),
        }
    }

    pub fn callback<F>(build: F) -> Self
    where
        F: Fn(&ExpressionBuilder) -> Expr + Send + Sync + 'static,
    {
        MapperFilter::Callback(Arc::new(build))
    }
}

impl fmt::Debug for MapperFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapperFilter::All => write!(f, "All"),
            MapperFilter::Key(value) => f.debug_tuple("Key").field(value).finish(),
            MapperFilter::KeyTuple(values) => f.debug_tuple("KeyTuple").field(values).finish(),
            MapperFilter::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            MapperFilter::Binary { column, op, value } => f
                .debug_struct("Binary")
                .field("column", column)
                .field("op", op)
                .field("value", value)
                .finish(),
            MapperFilter::Expr(expr) => f.debug_tuple("Expr").field(expr).finish(),
            MapperFilter::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

/// Value-level dispatch: objects match fields, arrays are key tuples,
/// anything else is a single key value
impl From<Value> for MapperFilter {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => MapperFilter::Fields(fields),
            Value::Array(values) => MapperFilter::KeyTuple(values),
            scalar => MapperFilter::Key(scalar),
        }
    }
}

impl From<Row> for MapperFilter {
    fn from(fields: Row) -> Self {
        MapperFilter::Fields(fields)
    }
}

impl From<Expr> for MapperFilter {
    fn from(expr: Expr) -> Self {
        MapperFilter::Expr(expr)
    }
}

/// Handed to filter callbacks for building expressions
#[derive(Debug)]
pub struct ExpressionBuilder {
    _private: (),
}

impl ExpressionBuilder {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    pub fn cmpr(&self, column: &str, operator: QueryOperator, value: impl Into<Parameter>) -> Expr {
        if operator.is_unary() {
            Expr::condition(column, operator, None)
        } else {
            Expr::condition(column, operator, Some(value.into()))
        }
    }

    pub fn eq(&self, column: &str, value: impl Into<Parameter>) -> Expr {
        Expr::eq(column, value)
    }

    pub fn in_list(&self, column: &str, values: Vec<Value>) -> Expr {
        Expr::in_values(column, values)
    }

    pub fn and(&self, filters: Vec<Expr>) -> Expr {
        Expr::and(filters)
    }

    pub fn or(&self, filters: Vec<Expr>) -> Expr {
        Expr::or(filters)
    }

    pub fn not(&self, filter: Expr) -> Expr {
        Expr::not(filter)
    }

    /// Raw SQL with `?` markers for its parameters
    pub fn raw(&self, sql: &str, parameters: Vec<Parameter>) -> Expr {
        Expr::raw(sql, parameters)
    }

    /// Named parameter, supplied per execution of a compiled query.
    ///
    /// A literal null compared with `=` or `!=` becomes `IS [NOT] NULL`, but
    /// the SQL of a compiled query is fixed, so a named parameter used with
    /// `=` or `!=` must not be null: execution fails with
    /// [`BuildError::NullComparison`](sql_builder::BuildError::NullComparison).
    pub fn param(&self, name: &str) -> Parameter {
        Parameter::Placeholder(Placeholder::param(name))
    }
}

/// Compile a filter into WHERE conditions (combined with AND)
pub fn compile_filter(binding: &TableBinding, filter: &MapperFilter) -> Result<Vec<Expr>, MapperError> {
    match filter {
        MapperFilter::All => Ok(Vec::new()),
        MapperFilter::Key(value) => {
            let keys = binding.require_key_columns()?;
            if keys.len() != 1 {
                return Err(MapperError::configuration(format!(
                    "a single key value needs exactly one key column, table '{}' declares {}",
                    binding.table(),
                    keys.len()
                )));
            }
            Ok(vec![Expr::eq(&keys[0], value.clone())])
        }
        MapperFilter::KeyTuple(values) => {
            let keys = binding.require_key_columns()?;
            if keys.len() != values.len() {
                return Err(MapperError::configuration(format!(
                    "key tuple has {} values, table '{}' declares {} key columns",
                    values.len(),
                    binding.table(),
                    keys.len()
                )));
            }
            Ok(keys
                .iter()
                .zip(values)
                .map(|(column, value)| Expr::eq(column, value.clone()))
                .collect())
        }
        MapperFilter::Fields(fields) => fields
            .iter()
            .map(|(column, value)| {
                binding.check_column(column)?;
                Ok(match value {
                    Value::Array(list) => Expr::in_values(column, list.clone()),
                    other => Expr::eq(column, other.clone()),
                })
            })
            .collect(),
        MapperFilter::Binary { column, op, value } => {
            binding.check_column(column)?;
            let operator = QueryOperator::parse(op)?;
            let value = if operator.is_unary() {
                None
            } else {
                Some(value.clone())
            };
            Ok(vec![Expr::condition(column, operator, value)])
        }
        MapperFilter::Expr(expr) => Ok(vec![expr.clone()]),
        MapperFilter::Callback(build) => Ok(vec![build(&ExpressionBuilder::new())]),
    }
}
