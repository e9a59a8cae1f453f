use super::{column_list, restrict_row};
use crate::compiling::CompilingInsertQuery;
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::transforms::RowTransforms;
use crate::Row;
use sql_builder::{InsertQuery, ReturningStatement, Returning};

pub struct MappingInsertQuery<T: RowTransforms> {
    mapper: TableMapper<T>,
    query: InsertQuery,
    columns: Option<Vec<String>>,
}

impl<T: RowTransforms> MappingInsertQuery<T> {
    pub(crate) fn new(mapper: TableMapper<T>, query: InsertQuery) -> Self {
        Self {
            mapper,
            query,
            columns: None,
        }
    }

    /// Write only these columns; each must be present on every inserted object
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(column_list(columns));
        self
    }

    pub fn modify<F>(self, modify: F) -> Self
    where
        F: FnOnce(InsertQuery) -> InsertQuery,
    {
        Self {
            query: modify(self.query),
            ..self
        }
    }

    fn to_rows(&self, objects: &[T::Insertable]) -> Result<Vec<Row>, MapperError> {
        let columns = self.columns.as_deref();
        objects
            .iter()
            .map(|object| {
                let row = self.mapper.transforms.insert_transform(object, columns)?;
                restrict_row(&self.mapper.binding, row, columns)
            })
            .collect()
    }

    fn statement(&self, rows: Vec<Row>, returning: Returning) -> InsertQuery {
        rows.into_iter()
            .fold(self.query.clone(), InsertQuery::values)
            .with_returning(returning)
    }

    /// Insert the objects; an empty slice issues no statement
    pub async fn run(&self, objects: &[T::Insertable]) -> Result<bool, MapperError> {
        if objects.is_empty() {
            return Ok(true);
        }

        let statement = self.statement(self.to_rows(objects)?, Returning::Nothing);
        self.mapper.execute_statement(&statement).await?;
        Ok(true)
    }

    /// Insert one object; `None` when no return columns are configured
    pub async fn return_one(
        &self,
        object: &T::Insertable,
    ) -> Result<Option<T::InsertReturn>, MapperError> {
        let rows = self.to_rows(std::slice::from_ref(object))?;
        let returning = self.mapper.binding.insert_returning().clone();

        if !returning.returns_rows() {
            self.mapper
                .execute_statement(&self.statement(rows, Returning::Nothing))
                .await?;
            return Ok(None);
        }

        let returned = self
            .mapper
            .fetch_statement(&self.statement(rows, returning))
            .await?;
        returned
            .into_iter()
            .next()
            .map(|row| self.mapper.transforms.insert_return_transform(object, row))
            .transpose()
    }

    /// Insert the objects, returning one result per object in order
    pub async fn return_all(
        &self,
        objects: &[T::Insertable],
    ) -> Result<Vec<T::InsertReturn>, MapperError> {
        if objects.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self.to_rows(objects)?;
        let returning = self.mapper.binding.insert_returning().clone();

        if !returning.returns_rows() {
            self.mapper
                .execute_statement(&self.statement(rows, Returning::Nothing))
                .await?;
            return Ok(Vec::new());
        }

        let returned = self
            .mapper
            .fetch_statement(&self.statement(rows, returning))
            .await?;
        objects
            .iter()
            .zip(returned)
            .map(|(object, row)| self.mapper.transforms.insert_return_transform(object, row))
            .collect()
    }

    /// Defer compilation to the first execution and reuse it afterwards
    pub fn compile(self) -> CompilingInsertQuery<T> {
        CompilingInsertQuery::new(self.mapper, self.query, self.columns)
    }
}
