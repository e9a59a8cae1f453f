use super::cache::StatementCache;
use super::{bind_placeholders, placeholder_row, DmlPlans};
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::queries::restrict_row;
use crate::transforms::RowTransforms;
use crate::Row;
use sql_builder::{debug_log, InsertQuery};

/// Insert compiled on first execution
///
/// The inserted columns are the subset columns when given, otherwise the
/// columns of the first object inserted. Later objects must carry every one
/// of them; extra fields are ignored.
pub struct CompilingInsertQuery<T: RowTransforms> {
    mapper: TableMapper<T>,
    columns: Option<Vec<String>>,
    cache: StatementCache<InsertQuery, DmlPlans>,
}

impl<T: RowTransforms> CompilingInsertQuery<T> {
    pub(crate) fn new(
        mapper: TableMapper<T>,
        query: InsertQuery,
        columns: Option<Vec<String>>,
    ) -> Self {
        Self {
            mapper,
            columns,
            cache: StatementCache::new(query),
        }
    }

    fn to_values(&self, object: &T::Insertable) -> Result<Row, MapperError> {
        let columns = self.columns.as_deref();
        let row = self.mapper.transforms.insert_transform(object, columns)?;
        restrict_row(&self.mapper.binding, row, columns)
    }

    fn plans(&self, values: &Row) -> Result<&DmlPlans, MapperError> {
        self.cache.get_or_compile(|query| {
            let columns = match &self.columns {
                Some(columns) => columns.clone(),
                None => values.keys().cloned().collect(),
            };
            debug_log!(
                "[COMPILE] INSERT on {} varying {:?}",
                self.mapper.binding.table(),
                columns
            );

            let statement = query.clone().row(placeholder_row(&columns));
            DmlPlans::compile(&statement, self.mapper.binding.insert_returning())
        })
    }

    /// Insert one object; `None` when no return columns are configured
    pub async fn return_one(
        &self,
        object: &T::Insertable,
    ) -> Result<Option<T::InsertReturn>, MapperError> {
        let values = self.to_values(object)?;
        let plans = self.plans(&values)?;

        let Some(returning) = &plans.returning else {
            let bound = bind_placeholders(&plans.plain, &Row::new(), &values)?;
            self.mapper.executor.execute(&bound).await?;
            return Ok(None);
        };

        let bound = bind_placeholders(returning, &Row::new(), &values)?;
        let rows = self.mapper.executor.fetch_rows(&bound).await?;
        rows.into_iter()
            .next()
            .map(|row| self.mapper.transforms.insert_return_transform(object, row))
            .transpose()
    }

    pub async fn run(&self, object: &T::Insertable) -> Result<bool, MapperError> {
        let values = self.to_values(object)?;
        let plans = self.plans(&values)?;
        let bound = bind_placeholders(&plans.plain, &Row::new(), &values)?;
        self.mapper.executor.execute(&bound).await?;
        Ok(true)
    }

    pub fn is_compiled(&self) -> bool {
        self.cache.is_compiled()
    }

    pub fn builder_released(&self) -> bool {
        self.cache.builder_released()
    }
}
