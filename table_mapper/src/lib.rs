//! Table Mapper - typed table access on top of `sql-builder`
//!
//! A [`TableMapper`] binds a table's key and projection columns to a set of
//! [`RowTransforms`] and runs select/insert/update/delete queries through
//! them. Queries can be compiled once and re-executed with new values; see
//! [`compiling`].
//!
//! ```rust,no_run
//! use table_mapper::prelude::*;
//! use serde_json::json;
//!
//! # async fn demo(pool: sqlx::PgPool) -> Result<(), MapperError> {
//! let binding = TableBinding::builder("users")
//!     .key_columns(["id"])
//!     .build()?;
//! let users = TableMapper::new(pool, binding);
//!
//! let values = json!({"name": "Sue", "handle": "s1"});
//! let inserted = users
//!     .insert()
//!     .return_one(values.as_object().unwrap())
//!     .await?;
//! let sues = users.select(json!({"name": "Sue"}))?.return_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod compiling;
pub mod errors;
pub mod executor;
pub mod filter;
pub mod mapper;
pub mod prelude;
pub mod queries;
pub mod transaction;
pub mod transforms;
pub mod uniform;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use binding::{ColumnSet, ReturnColumns, TableBinding, TableBindingBuilder, MAX_KEY_COLUMNS};
pub use compiling::{
    CompilingDeleteQuery, CompilingInsertQuery, CompilingSelectQuery, CompilingUpdateQuery,
};
pub use errors::MapperError;
pub use executor::QueryExecutor;
pub use filter::{compile_filter, ExpressionBuilder, FilterCallback, MapperFilter};
pub use mapper::TableMapper;
pub use queries::{MappingDeleteQuery, MappingInsertQuery, MappingSelectQuery, MappingUpdateQuery};
pub use transaction::MapperTransaction;
pub use transforms::{from_row, to_row, FromCount, NoTransforms, RowTransforms};
pub use uniform::{MappedObject, MappedObjectPredicate, UniformTableMapper, UniformTransforms};

pub use sql_builder::Row;
