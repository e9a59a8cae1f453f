//! Query wrappers
//!
//! Each wrapper holds one statement builder and runs it through the owning
//! mapper's transforms. Statements are compiled on every execution; see
//! [`compiling`](crate::compiling) for wrappers that compile once.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::MappingDeleteQuery;
pub use insert::MappingInsertQuery;
pub use select::MappingSelectQuery;
pub use update::MappingUpdateQuery;

pub(crate) use select::first_row_query;

use crate::binding::TableBinding;
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::transforms::RowTransforms;
use crate::Row;
use sql_builder::Statement;

impl<T: RowTransforms> TableMapper<T> {
    pub(crate) async fn execute_statement<S: Statement>(&self, statement: &S) -> Result<u64, MapperError> {
        let bound = statement.compile()?.into_bound()?;
        self.executor.execute(&bound).await
    }

    pub(crate) async fn fetch_statement<S: Statement>(&self, statement: &S) -> Result<Vec<Row>, MapperError> {
        let bound = statement.compile()?.into_bound()?;
        self.executor.fetch_rows(&bound).await
    }
}

/// Keep exactly the listed columns of a row
///
/// Every listed column must be present, even if null. Without a list the row
/// is returned as is.
pub(crate) fn restrict_row(
    binding: &TableBinding,
    row: Row,
    columns: Option<&[String]>,
) -> Result<Row, MapperError> {
    let Some(columns) = columns else {
        return Ok(row);
    };

    let mut restricted = Row::new();
    for column in columns {
        binding.check_column(column)?;
        let value = row
            .get(column)
            .ok_or_else(|| MapperError::missing_column(column))?;
        restricted.insert(column.clone(), value.clone());
    }
    Ok(restricted)
}

/// Deduplicated owned column list
pub(crate) fn column_list<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut list: Vec<String> = Vec::new();
    for column in columns {
        let column = column.into();
        if !list.contains(&column) {
            list.push(column);
        }
    }
    list
}
