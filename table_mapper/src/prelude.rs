//! Prelude module for convenient imports
//!
//! ```rust
//! use table_mapper::prelude::*;
//! ```

pub use crate::binding::{ColumnSet, ReturnColumns, TableBinding};
pub use crate::errors::MapperError;
pub use crate::executor::QueryExecutor;
pub use crate::filter::{ExpressionBuilder, MapperFilter};
pub use crate::mapper::TableMapper;
pub use crate::transaction::MapperTransaction;
pub use crate::transforms::{FromCount, NoTransforms, RowTransforms};
pub use crate::uniform::UniformTableMapper;
pub use crate::Row;

pub use sql_builder::{ColumnType, ColumnTypes, Expr, Parameter, QueryOperator, SortOrder};
