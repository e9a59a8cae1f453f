//! Expression sublanguage
//!
//! Predicates accepted by the WHERE clause of every statement builder.

use crate::errors::BuildError;
use crate::parameter::Parameter;
use serde_json::Value;
use std::fmt;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    Like,      // LIKE
    ILike,     // ILIKE (case insensitive)
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

impl QueryOperator {
    /// Parse an operator from its SQL spelling, as used by three-argument filters
    pub fn parse(op: &str) -> Result<Self, BuildError> {
        let normalized = op
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        match normalized.as_str() {
            "=" | "==" | "is" => Ok(QueryOperator::Eq),
            "!=" | "<>" | "is not" => Ok(QueryOperator::Ne),
            ">" => Ok(QueryOperator::Gt),
            ">=" => Ok(QueryOperator::Gte),
            "<" => Ok(QueryOperator::Lt),
            "<=" => Ok(QueryOperator::Lte),
            "like" => Ok(QueryOperator::Like),
            "ilike" => Ok(QueryOperator::ILike),
            "in" => Ok(QueryOperator::In),
            "not in" => Ok(QueryOperator::NotIn),
            "is null" => Ok(QueryOperator::IsNull),
            "is not null" => Ok(QueryOperator::IsNotNull),
            _ => Err(BuildError::UnknownOperator(op.to_string())),
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "=",
            QueryOperator::Ne => "!=",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
            QueryOperator::Like => "LIKE",
            QueryOperator::ILike => "ILIKE",
            QueryOperator::In => "IN",
            QueryOperator::NotIn => "NOT IN",
            QueryOperator::IsNull => "IS NULL",
            QueryOperator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator takes no right-hand operand
    pub fn is_unary(&self) -> bool {
        matches!(self, QueryOperator::IsNull | QueryOperator::IsNotNull)
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Option<Parameter>, // None for IS NULL/IS NOT NULL
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Predicate expression that can be nested
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<Expr>,
    },
    Not(Box<Expr>),
    /// SQL fragment with `?` markers, each consuming one parameter in order
    Raw {
        sql: String,
        parameters: Vec<Parameter>,
    },
    /// Matches every row
    True,
}

impl Expr {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, value: Option<Parameter>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            value,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<Expr>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<Expr>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Expr) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Raw SQL fragment, passed through to the WHERE clause untouched apart from
    /// `?` markers being renumbered
    pub fn raw(sql: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self::Raw {
            sql: sql.into(),
            parameters,
        }
    }

    pub fn always() -> Self {
        Self::True
    }

    pub fn eq(field: &str, value: impl Into<Parameter>) -> Self {
        Self::condition(field, QueryOperator::Eq, Some(value.into()))
    }

    pub fn ne(field: &str, value: impl Into<Parameter>) -> Self {
        Self::condition(field, QueryOperator::Ne, Some(value.into()))
    }

    pub fn gt(field: &str, value: impl Into<Parameter>) -> Self {
        Self::condition(field, QueryOperator::Gt, Some(value.into()))
    }

    pub fn gte(field: &str, value: impl Into<Parameter>) -> Self {
        Self::condition(field, QueryOperator::Gte, Some(value.into()))
    }

    pub fn lt(field: &str, value: impl Into<Parameter>) -> Self {
        Self::condition(field, QueryOperator::Lt, Some(value.into()))
    }

    pub fn lte(field: &str, value: impl Into<Parameter>) -> Self {
        Self::condition(field, QueryOperator::Lte, Some(value.into()))
    }

    pub fn like(field: &str, pattern: &str) -> Self {
        Self::condition(field, QueryOperator::Like, Some(pattern.into()))
    }

    pub fn ilike(field: &str, pattern: &str) -> Self {
        Self::condition(field, QueryOperator::ILike, Some(pattern.into()))
    }

    pub fn in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(
            field,
            QueryOperator::In,
            Some(Parameter::Value(Value::Array(values))),
        )
    }

    pub fn not_in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(
            field,
            QueryOperator::NotIn,
            Some(Parameter::Value(Value::Array(values))),
        )
    }

    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, None)
    }

    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, None)
    }
}
