//! SQL Builder - statement construction layer for tablemap
//!
//! Builds PostgreSQL SELECT/INSERT/UPDATE/DELETE statements from typed builders,
//! compiles them into SQL text plus an ordered parameter list, and resolves
//! placeholders left in the parameter list just before execution.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod column_types;
pub mod columns;
pub mod compiled;
pub mod errors;
pub mod expr;
pub mod ordering;
pub mod parameter;
pub mod sql_generation;
pub mod statement;
pub mod validation;


pub use column_types::{ColumnType, ColumnTypes};
pub use columns::{ColumnRef, Returning, Selection};
pub use compiled::{BoundQuery, CompiledQuery};
pub use errors::BuildError;
pub use expr::{Expr, LogicalOperator, QueryCondition, QueryOperator};
pub use ordering::SortOrder;
pub use parameter::{Parameter, ParameterList, Placeholder};
pub use statement::{
    DeleteQuery, InsertQuery, ReturningStatement, SelectQuery, Statement, UpdateOperation,
    UpdateQuery,
};
pub use validation::{ValidatedIdentifier, ValidationError};

/// A single row as exchanged with the database: column name to JSON value
pub type Row = serde_json::Map<String, serde_json::Value>;
