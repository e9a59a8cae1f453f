use crate::compiling::CompilingSelectQuery;
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::transforms::RowTransforms;
use sql_builder::SelectQuery;

pub struct MappingSelectQuery<T: RowTransforms> {
    mapper: TableMapper<T>,
    query: SelectQuery,
}

impl<T: RowTransforms> MappingSelectQuery<T> {
    pub(crate) fn new(mapper: TableMapper<T>, query: SelectQuery) -> Self {
        Self { mapper, query }
    }

    /// The underlying statement builder
    pub fn query(&self) -> &SelectQuery {
        &self.query
    }

    /// Rework the underlying builder, e.g. to add ordering or paging
    pub fn modify<F>(self, modify: F) -> Self
    where
        F: FnOnce(SelectQuery) -> SelectQuery,
    {
        Self {
            mapper: self.mapper,
            query: modify(self.query),
        }
    }

    pub async fn return_all(&self) -> Result<Vec<T::Selected>, MapperError> {
        let rows = self.mapper.fetch_statement(&self.query).await?;
        rows.into_iter()
            .map(|row| self.mapper.transforms.select_transform(row))
            .collect()
    }

    /// First matching row, `None` when nothing matches
    pub async fn return_one(&self) -> Result<Option<T::Selected>, MapperError> {
        let rows = self
            .mapper
            .fetch_statement(&first_row_query(&self.query))
            .await?;
        rows.into_iter()
            .next()
            .map(|row| self.mapper.transforms.select_transform(row))
            .transpose()
    }

    /// Defer compilation to the first execution and reuse it afterwards
    pub fn compile(self) -> CompilingSelectQuery<T> {
        CompilingSelectQuery::new(self.mapper, self.query)
    }
}

/// Limit to one row unless the caller already set a limit
pub(crate) fn first_row_query(query: &SelectQuery) -> SelectQuery {
    match query.limit_value() {
        Some(_) => query.clone(),
        None => query.clone().limit(1),
    }
}
