use super::bind_placeholders;
use super::cache::StatementCache;
use crate::errors::MapperError;
use crate::mapper::TableMapper;
use crate::queries::first_row_query;
use crate::transforms::RowTransforms;
use crate::Row;
use sql_builder::{debug_log, CompiledQuery, SelectQuery, Statement};

struct SelectPlans {
    all: CompiledQuery,
    first: CompiledQuery,
}

/// Select compiled on first execution; named parameters vary per call
pub struct CompilingSelectQuery<T: RowTransforms> {
    mapper: TableMapper<T>,
    cache: StatementCache<SelectQuery, SelectPlans>,
}

impl<T: RowTransforms> CompilingSelectQuery<T> {
    pub(crate) fn new(mapper: TableMapper<T>, query: SelectQuery) -> Self {
        Self {
            mapper,
            cache: StatementCache::new(query),
        }
    }

    fn plans(&self) -> Result<&SelectPlans, MapperError> {
        self.cache.get_or_compile(|query| {
            debug_log!("[COMPILE] SELECT on {}", query.table());
            Ok(SelectPlans {
                all: query.compile()?,
                first: first_row_query(query).compile()?,
            })
        })
    }

    pub async fn return_all(&self, params: &Row) -> Result<Vec<T::Selected>, MapperError> {
        let bound = bind_placeholders(&self.plans()?.all, params, &Row::new())?;
        let rows = self.mapper.executor.fetch_rows(&bound).await?;
        rows.into_iter()
            .map(|row| self.mapper.transforms.select_transform(row))
            .collect()
    }

    pub async fn return_one(&self, params: &Row) -> Result<Option<T::Selected>, MapperError> {
        let bound = bind_placeholders(&self.plans()?.first, params, &Row::new())?;
        let rows = self.mapper.executor.fetch_rows(&bound).await?;
        rows.into_iter()
            .next()
            .map(|row| self.mapper.transforms.select_transform(row))
            .transpose()
    }

    pub fn is_compiled(&self) -> bool {
        self.cache.is_compiled()
    }

    pub fn builder_released(&self) -> bool {
        self.cache.builder_released()
    }
}
