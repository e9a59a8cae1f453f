use super::cache::StatementCache;
use super::{bind_placeholders, placeholder_row, DmlPlans};
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::queries::restrict_row;
use crate::transforms::RowTransforms;
use crate::Row;
use sql_builder::{debug_log, UpdateQuery};

/// Update compiled on first execution
///
/// The updated columns are the subset columns when given, otherwise the
/// columns of the first updating object. Filter parameters created with
/// [`ExpressionBuilder::param`](crate::ExpressionBuilder::param) are read
/// from `params` on every call.
pub struct CompilingUpdateQuery<T: RowTransforms> {
    mapper: TableMapper<T>,
    columns: Option<Vec<String>>,
    cache: StatementCache<UpdateQuery, DmlPlans>,
}

impl<T: RowTransforms> CompilingUpdateQuery<T> {
    pub(crate) fn new(
        mapper: TableMapper<T>,
        query: UpdateQuery,
        columns: Option<Vec<String>>,
    ) -> Self {
        Self {
            mapper,
            columns,
            cache: StatementCache::new(query),
        }
    }

    fn to_values(&self, object: &T::Updating) -> Result<Row, MapperError> {
        let columns = self.columns.as_deref();
        let row = self.mapper.transforms.update_transform(object, columns)?;
        restrict_row(&self.mapper.binding, row, columns)
    }

    fn plans(&self, values: &Row) -> Result<&DmlPlans, MapperError> {
        self.cache.get_or_compile(|query| {
            let columns = match &self.columns {
                Some(columns) => columns.clone(),
                None => values.keys().cloned().collect(),
            };
            debug_log!(
                "[COMPILE] UPDATE on {} varying {:?}",
                self.mapper.binding.table(),
                columns
            );

            let statement = placeholder_row(&columns)
                .into_iter()
                .fold(query.clone(), |statement, (column, placeholder)| {
                    statement.set(column, placeholder)
                });
            DmlPlans::compile(&statement, self.mapper.binding.update_returning())
        })
    }

    pub async fn return_count(&self, params: &Row, object: &T::Updating) -> Result<T::Count, MapperError> {
        let values = self.to_values(object)?;
        let bound = bind_placeholders(&self.plans(&values)?.plain, params, &values)?;
        let count = self.mapper.executor.execute(&bound).await?;
        self.mapper.transforms.count_transform(count)
    }

    pub async fn run(&self, params: &Row, object: &T::Updating) -> Result<bool, MapperError> {
        let values = self.to_values(object)?;
        let bound = bind_placeholders(&self.plans(&values)?.plain, params, &values)?;
        Ok(self.mapper.executor.execute(&bound).await? > 0)
    }

    pub async fn return_one(
        &self,
        params: &Row,
        object: &T::Updating,
    ) -> Result<Option<T::UpdateReturn>, MapperError> {
        Ok(self.return_all(params, object).await?.into_iter().next())
    }

    pub async fn return_all(
        &self,
        params: &Row,
        object: &T::Updating,
    ) -> Result<Vec<T::UpdateReturn>, MapperError> {
        let values = self.to_values(object)?;
        let plans = self.plans(&values)?;

        let Some(returning) = &plans.returning else {
            let bound = bind_placeholders(&plans.plain, params, &values)?;
            self.mapper.executor.execute(&bound).await?;
            return Ok(Vec::new());
        };

        let bound = bind_placeholders(returning, params, &values)?;
        let rows = self.mapper.executor.fetch_rows(&bound).await?;
        rows.into_iter()
            .map(|row| self.mapper.transforms.update_return_transform(object, row))
            .collect()
    }

    pub fn is_compiled(&self) -> bool {
        self.cache.is_compiled()
    }

    pub fn builder_released(&self) -> bool {
        self.cache.builder_released()
    }
}
