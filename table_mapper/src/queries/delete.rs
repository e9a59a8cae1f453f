use crate::compiling::CompilingDeleteQuery;
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::transforms::RowTransforms;
use sql_builder::DeleteQuery;

pub struct MappingDeleteQuery<T: RowTransforms> {
    mapper: TableMapper<T>,
    query: DeleteQuery,
}

impl<T: RowTransforms> MappingDeleteQuery<T> {
    pub(crate) fn new(mapper: TableMapper<T>, query: DeleteQuery) -> Self {
        Self { mapper, query }
    }

    pub fn modify<F>(self, modify: F) -> Self
    where
        F: FnOnce(DeleteQuery) -> DeleteQuery,
    {
        Self {
            mapper: self.mapper,
            query: modify(self.query),
        }
    }

    /// Number of rows deleted, through the count transform
    pub async fn return_count(&self) -> Result<T::Count, MapperError> {
        let count = self.mapper.execute_statement(&self.query).await?;
        self.mapper.transforms.count_transform(count)
    }

    /// True when at least one row was deleted
    pub async fn run(&self) -> Result<bool, MapperError> {
        Ok(self.mapper.execute_statement(&self.query).await? > 0)
    }

    /// Defer compilation to the first execution and reuse it afterwards
    pub fn compile(self) -> CompilingDeleteQuery<T> {
        CompilingDeleteQuery::new(self.mapper, self.query)
    }
}
