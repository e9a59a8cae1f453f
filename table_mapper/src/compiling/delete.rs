use super::bind_placeholders;
use super::cache::StatementCache;
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::transforms::RowTransforms;
use crate::Row;
use sql_builder::{debug_log, CompiledQuery, DeleteQuery, Statement};

/// Delete compiled on first execution; named parameters vary per call
pub struct CompilingDeleteQuery<T: RowTransforms> {
    mapper: TableMapper<T>,
    cache: StatementCache<DeleteQuery, CompiledQuery>,
}

impl<T: RowTransforms> CompilingDeleteQuery<T> {
    pub(crate) fn new(mapper: TableMapper<T>, query: DeleteQuery) -> Self {
        Self {
            mapper,
            cache: StatementCache::new(query),
        }
    }

    async fn execute(&self, params: &Row) -> Result<u64, MapperError> {
        let compiled = self.cache.get_or_compile(|query| {
            debug_log!("[COMPILE] DELETE on {}", query.table());
            Ok(query.compile()?)
        })?;
        let bound = bind_placeholders(compiled, params, &Row::new())?;
        self.mapper.executor.execute(&bound).await
    }

    pub async fn return_count(&self, params: &Row) -> Result<T::Count, MapperError> {
        let count = self.execute(params).await?;
        self.mapper.transforms.count_transform(count)
    }

    pub async fn run(&self, params: &Row) -> Result<bool, MapperError> {
        Ok(self.execute(params).await? > 0)
    }

    pub fn is_compiled(&self) -> bool {
        self.cache.is_compiled()
    }

    pub fn builder_released(&self) -> bool {
        self.cache.builder_released()
    }
}
