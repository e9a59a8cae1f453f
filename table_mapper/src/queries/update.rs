use super::{column_list, restrict_row};
use crate::compiling::CompilingUpdateQuery;
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::transforms::RowTransforms;
use sql_builder::{ReturningStatement, Returning, UpdateQuery};

pub struct MappingUpdateQuery<T: RowTransforms> {
    mapper: TableMapper<T>,
    query: UpdateQuery,
    columns: Option<Vec<String>>,
}

impl<T: RowTransforms> MappingUpdateQuery<T> {
    pub(crate) fn new(mapper: TableMapper<T>, query: UpdateQuery) -> Self {
        Self {
            mapper,
            query,
            columns: None,
        }
    }

    /// Write only these columns; each must be present on the updating object
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(column_list(columns));
        self
    }

    /// Rework the underlying builder, e.g. to add increments
    pub fn modify<F>(self, modify: F) -> Self
    where
        F: FnOnce(UpdateQuery) -> UpdateQuery,
    {
        Self {
            query: modify(self.query),
            ..self
        }
    }

    fn statement(
        &self,
        object: &T::Updating,
        returning: Returning,
    ) -> Result<UpdateQuery, MapperError> {
        let columns = self.columns.as_deref();
        let row = self.mapper.transforms.update_transform(object, columns)?;
        let row = restrict_row(&self.mapper.binding, row, columns)?;
        Ok(self.query.clone().set_row(row).with_returning(returning))
    }

    /// Number of rows updated, through the count transform
    pub async fn return_count(&self, object: &T::Updating) -> Result<T::Count, MapperError> {
        let statement = self.statement(object, Returning::Nothing)?;
        let count = self.mapper.execute_statement(&statement).await?;
        self.mapper.transforms.count_transform(count)
    }

    /// True when at least one row was updated
    pub async fn run(&self, object: &T::Updating) -> Result<bool, MapperError> {
        let statement = self.statement(object, Returning::Nothing)?;
        Ok(self.mapper.execute_statement(&statement).await? > 0)
    }

    /// First updated row; `None` when nothing matched or no return columns
    /// are configured
    pub async fn return_one(
        &self,
        object: &T::Updating,
    ) -> Result<Option<T::UpdateReturn>, MapperError> {
        Ok(self.return_all(object).await?.into_iter().next())
    }

    pub async fn return_all(
        &self,
        object: &T::Updating,
    ) -> Result<Vec<T::UpdateReturn>, MapperError> {
        let returning = self.mapper.binding.update_returning().clone();

        if !returning.returns_rows() {
            let statement = self.statement(object, Returning::Nothing)?;
            self.mapper.execute_statement(&statement).await?;
            return Ok(Vec::new());
        }

        let statement = self.statement(object, returning)?;
        let rows = self.mapper.fetch_statement(&statement).await?;
        rows.into_iter()
            .map(|row| self.mapper.transforms.update_return_transform(object, row))
            .collect()
    }

    /// Defer compilation to the first execution and reuse it afterwards
    pub fn compile(self) -> CompilingUpdateQuery<T> {
        CompilingUpdateQuery::new(self.mapper, self.query, self.columns)
    }
}
