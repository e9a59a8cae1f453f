//! Uniform table mappers
//!
//! A uniform mapper uses one object type for selecting, inserting and
//! updating. Callers hand it either such an object or a plain filter value;
//! a caller-supplied predicate tells the two apart.

use crate::binding::TableBinding;
use crate::errors::MapperError;
use crate::executor::QueryExecutor;
use crate::filter::MapperFilter;
use crate::mapper::TableMapper;
use crate::transforms::{from_row, to_row, RowTransforms};
use crate::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

pub type MappedObjectPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Bound on objects a uniform mapper handles
pub trait MappedObject: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<M> MappedObject for M where M: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Transforms of a uniform mapper
///
/// Null key values are left out of inserts so the database assigns them,
/// key columns are never updated, and returned columns are merged over the
/// object that was written.
pub struct UniformTransforms<M> {
    key_columns: Vec<String>,
    _object: PhantomData<fn() -> M>,
}

impl<M> UniformTransforms<M> {
    pub fn new(key_columns: Vec<String>) -> Self {
        Self {
            key_columns,
            _object: PhantomData,
        }
    }
}

fn merge_returned<M: MappedObject>(source: &M, returns: Row) -> Result<M, MapperError> {
    let mut row = to_row(source)?;
    row.extend(returns);
    from_row(row)
}

impl<M: MappedObject> RowTransforms for UniformTransforms<M> {
    type Selected = M;
    type Insertable = M;
    type Updating = M;
    type InsertReturn = M;
    type UpdateReturn = M;
    type Count = u64;

    fn insert_transform(&self, object: &M, _columns: Option<&[String]>) -> Result<Row, MapperError> {
        let mut row = to_row(object)?;
        for key in &self.key_columns {
            if row.get(key).is_some_and(Value::is_null) {
                row.remove(key);
            }
        }
        Ok(row)
    }

    fn insert_return_transform(&self, source: &M, returns: Row) -> Result<M, MapperError> {
        merge_returned(source, returns)
    }

    fn update_transform(&self, object: &M, _columns: Option<&[String]>) -> Result<Row, MapperError> {
        let mut row = to_row(object)?;
        for key in &self.key_columns {
            row.remove(key);
        }
        Ok(row)
    }

    fn update_return_transform(&self, source: &M, returns: Row) -> Result<M, MapperError> {
        merge_returned(source, returns)
    }
}

pub struct UniformTableMapper<M: MappedObject> {
    mapper: TableMapper<UniformTransforms<M>>,
    is_mapped_object: MappedObjectPredicate,
}

impl<M: MappedObject> Clone for UniformTableMapper<M> {
    fn clone(&self) -> Self {
        Self {
            mapper: self.mapper.clone(),
            is_mapped_object: Arc::clone(&self.is_mapped_object),
        }
    }
}

impl<M: MappedObject> UniformTableMapper<M> {
    /// The binding must declare key columns
    pub fn new<E, F>(executor: E, binding: TableBinding, is_mapped_object: F) -> Result<Self, MapperError>
    where
        E: QueryExecutor + 'static,
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let key_columns = binding.require_key_columns()?.to_vec();
        let mapper = TableMapper::new(executor, binding)
            .with_transforms(UniformTransforms::<M>::new(key_columns));
        Ok(Self {
            mapper,
            is_mapped_object: Arc::new(is_mapped_object),
        })
    }

    /// The underlying mapper, for queries beyond the object helpers
    pub fn mapper(&self) -> &TableMapper<UniformTransforms<M>> {
        &self.mapper
    }

    pub fn for_transaction<E: QueryExecutor + 'static>(&self, executor: E) -> Self {
        Self {
            mapper: self.mapper.for_transaction(executor),
            is_mapped_object: Arc::clone(&self.is_mapped_object),
        }
    }

    /// Mapped objects filter by their key columns; any other value goes
    /// through the usual value-level dispatch
    pub fn filter_for(&self, value: Value) -> Result<MapperFilter, MapperError> {
        if !(self.is_mapped_object)(&value) {
            return Ok(MapperFilter::from(value));
        }

        match value {
            Value::Object(row) => self.key_filter(&row),
            _ => Err(MapperError::configuration(
                "mapped objects must serialize to JSON objects",
            )),
        }
    }

    fn key_filter(&self, row: &Row) -> Result<MapperFilter, MapperError> {
        let keys = self.mapper.binding().require_key_columns()?;
        let values = keys
            .iter()
            .map(|key| {
                row.get(key)
                    .cloned()
                    .ok_or_else(|| MapperError::missing_column(key))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MapperFilter::KeyTuple(values))
    }

    fn object_filter(&self, object: &M) -> Result<MapperFilter, MapperError> {
        self.key_filter(&to_row(object)?)
    }

    pub async fn select_by(&self, filter: Value) -> Result<Vec<M>, MapperError> {
        self.mapper.select(self.filter_for(filter)?)?.return_all().await
    }

    pub async fn select_one_by(&self, filter: Value) -> Result<Option<M>, MapperError> {
        self.mapper.select(self.filter_for(filter)?)?.return_one().await
    }

    /// Insert an object, returning it with the returned columns merged in
    pub async fn insert_returning(&self, object: &M) -> Result<M, MapperError> {
        let returned = self.mapper.insert().return_one(object).await?;
        Ok(returned.unwrap_or_else(|| object.clone()))
    }

    /// Update the row with the object's key; true when a row changed
    pub async fn update_object(&self, object: &M) -> Result<bool, MapperError> {
        self.mapper
            .update(self.object_filter(object)?)?
            .run(object)
            .await
    }

    /// Update the row with the object's key, returning the stored object, or
    /// `None` when no row has that key
    pub async fn update_object_returning(&self, object: &M) -> Result<Option<M>, MapperError> {
        let query = self.mapper.update(self.object_filter(object)?)?;
        if self.mapper.binding().update_return_columns().is_empty() {
            let updated = query.run(object).await?;
            return Ok(updated.then(|| object.clone()));
        }
        query.return_one(object).await
    }

    pub async fn delete_object(&self, object: &M) -> Result<bool, MapperError> {
        self.mapper.delete(self.object_filter(object)?)?.run().await
    }

    /// Delete by filter value, returning the number of rows deleted
    pub async fn delete_by(&self, filter: Value) -> Result<u64, MapperError> {
        self.mapper
            .delete(self.filter_for(filter)?)?
            .return_count()
            .await
    }
}
