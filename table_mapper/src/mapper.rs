use crate::binding::TableBinding;
use crate::errors::MapperError;
use crate::executor::QueryExecutor;
use crate::filter::{compile_filter, MapperFilter};
use crate::queries::{MappingDeleteQuery, MappingInsertQuery, MappingSelectQuery, MappingUpdateQuery};
use crate::transforms::{NoTransforms, RowTransforms};
use sql_builder::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery};
use std::sync::Arc;

/// Typed access to one table
///
/// A mapper pairs a [`TableBinding`] with a set of [`RowTransforms`] and the
/// executor its queries run on. Cloning is cheap; the binding and transforms
/// are shared.
pub struct TableMapper<T: RowTransforms = NoTransforms> {
    pub(crate) executor: Arc<dyn QueryExecutor>,
    pub(crate) binding: Arc<TableBinding>,
    pub(crate) transforms: Arc<T>,
}

impl<T: RowTransforms> Clone for TableMapper<T> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            binding: Arc::clone(&self.binding),
            transforms: Arc::clone(&self.transforms),
        }
    }
}

impl<T: RowTransforms> std::fmt::Debug for TableMapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableMapper")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

impl TableMapper<NoTransforms> {
    pub fn new<E: QueryExecutor + 'static>(executor: E, binding: TableBinding) -> Self {
        Self {
            executor: Arc::new(executor),
            binding: Arc::new(binding),
            transforms: Arc::new(NoTransforms),
        }
    }
}

impl<T: RowTransforms> TableMapper<T> {
    /// New mapper with the same binding and executor but other transforms
    pub fn with_transforms<U: RowTransforms>(&self, transforms: U) -> TableMapper<U> {
        TableMapper {
            executor: Arc::clone(&self.executor),
            binding: Arc::clone(&self.binding),
            transforms: Arc::new(transforms),
        }
    }

    /// New mapper running its queries on another connection handle
    pub fn for_transaction<E: QueryExecutor + 'static>(&self, executor: E) -> Self {
        Self {
            executor: Arc::new(executor),
            binding: Arc::clone(&self.binding),
            transforms: Arc::clone(&self.transforms),
        }
    }

    pub fn binding(&self) -> &TableBinding {
        &self.binding
    }

    pub fn transforms(&self) -> &T {
        &self.transforms
    }

    pub fn select(&self, filter: impl Into<MapperFilter>) -> Result<MappingSelectQuery<T>, MapperError> {
        let conditions = compile_filter(&self.binding, &filter.into())?;
        let query = SelectQuery::new(self.binding.table())
            .with_column_types(self.binding.column_types().clone())
            .select(self.binding.selection().clone())
            .filters(conditions);
        Ok(MappingSelectQuery::new(self.clone(), query))
    }

    pub fn insert(&self) -> MappingInsertQuery<T> {
        let query = InsertQuery::new(self.binding.table())
            .with_column_types(self.binding.column_types().clone());
        MappingInsertQuery::new(self.clone(), query)
    }

    pub fn update(&self, filter: impl Into<MapperFilter>) -> Result<MappingUpdateQuery<T>, MapperError> {
        let conditions = compile_filter(&self.binding, &filter.into())?;
        let query = conditions
            .into_iter()
            .fold(self.update_statement(), UpdateQuery::filter);
        Ok(MappingUpdateQuery::new(self.clone(), query))
    }

    pub fn delete(&self, filter: impl Into<MapperFilter>) -> Result<MappingDeleteQuery<T>, MapperError> {
        let conditions = compile_filter(&self.binding, &filter.into())?;
        let query = conditions
            .into_iter()
            .fold(self.delete_statement(), DeleteQuery::filter);
        Ok(MappingDeleteQuery::new(self.clone(), query))
    }

    fn update_statement(&self) -> UpdateQuery {
        UpdateQuery::new(self.binding.table())
            .with_column_types(self.binding.column_types().clone())
    }

    fn delete_statement(&self) -> DeleteQuery {
        DeleteQuery::new(self.binding.table())
            .with_column_types(self.binding.column_types().clone())
    }
}
