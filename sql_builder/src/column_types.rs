//! Declared column types
//!
//! A parameter bound for a column with a declared type is rendered as
//! `$n::<type>` and travels to the server as text (or jsonb for JSON columns),
//! so every value reaches PostgreSQL in one stable parameter type and the
//! server performs the conversion. Columns without a declaration bind by the
//! JSON kind of the value.

use crate::errors::BuildError;
use crate::validation::validate_column_reference;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Boolean,
    Uuid,
    Date,
    Time,
    Timestamp,
    Timestamptz,
    Interval,
    Json,
    Jsonb,
    Bytea,
    /// A user-defined type such as an enum or domain, possibly schema-qualified
    Named(String),
}

impl ColumnType {
    /// Validated user-defined type name
    pub fn named(name: impl Into<String>) -> Result<Self, BuildError> {
        let name = name.into();
        validate_column_reference(&name)?;
        Ok(ColumnType::Named(name))
    }

    /// Parse a PostgreSQL type name; unknown names become [`ColumnType::Named`]
    pub fn parse(name: &str) -> Result<Self, BuildError> {
        let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(match normalized.to_ascii_lowercase().as_str() {
            "text" | "varchar" | "character varying" => ColumnType::Text,
            "smallint" | "int2" => ColumnType::SmallInt,
            "integer" | "int" | "int4" | "serial" => ColumnType::Integer,
            "bigint" | "int8" | "bigserial" => ColumnType::BigInt,
            "real" | "float4" => ColumnType::Real,
            "double precision" | "float8" => ColumnType::Double,
            "numeric" | "decimal" => ColumnType::Numeric,
            "boolean" | "bool" => ColumnType::Boolean,
            "uuid" => ColumnType::Uuid,
            "date" => ColumnType::Date,
            "time" => ColumnType::Time,
            "timestamp" => ColumnType::Timestamp,
            "timestamptz" | "timestamp with time zone" => ColumnType::Timestamptz,
            "interval" => ColumnType::Interval,
            "json" => ColumnType::Json,
            "jsonb" => ColumnType::Jsonb,
            "bytea" => ColumnType::Bytea,
            _ => ColumnType::named(normalized)?,
        })
    }

    /// Type name as written in a cast
    pub fn to_sql(&self) -> &str {
        match self {
            ColumnType::Text => "text",
            ColumnType::SmallInt => "int2",
            ColumnType::Integer => "int4",
            ColumnType::BigInt => "int8",
            ColumnType::Real => "float4",
            ColumnType::Double => "float8",
            ColumnType::Numeric => "numeric",
            ColumnType::Boolean => "bool",
            ColumnType::Uuid => "uuid",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Timestamptz => "timestamptz",
            ColumnType::Interval => "interval",
            ColumnType::Json => "json",
            ColumnType::Jsonb => "jsonb",
            ColumnType::Bytea => "bytea",
            ColumnType::Named(name) => name,
        }
    }

    /// JSON columns receive the JSON document itself rather than its text
    pub fn is_json(&self) -> bool {
        matches!(self, ColumnType::Json | ColumnType::Jsonb)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// Column name to declared type, shared between statement builders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypes {
    types: Arc<BTreeMap<String, ColumnType>>,
}

impl ColumnTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        Arc::make_mut(&mut self.types).insert(column.into(), column_type);
        self
    }

    /// Type of a column; qualified references (`t.col`) fall back to the
    /// bare column name
    pub fn get(&self, column: &str) -> Option<&ColumnType> {
        self.types.get(column).or_else(|| {
            column
                .rsplit_once('.')
                .and_then(|(_, bare)| self.types.get(bare))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColumnType)> {
        self.types.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnType)> for ColumnTypes {
    fn from_iter<I: IntoIterator<Item = (S, ColumnType)>>(iter: I) -> Self {
        Self {
            types: Arc::new(
                iter.into_iter()
                    .map(|(column, column_type)| (column.into(), column_type))
                    .collect(),
            ),
        }
    }
}
