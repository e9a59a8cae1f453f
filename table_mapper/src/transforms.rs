//! Row transforms
//!
//! Six hooks mediate between caller-facing objects and the rows exchanged
//! with the database. Every hook has a default that passes the value through
//! unchanged by way of serde, so an implementation overrides only the
//! boundaries it cares about.

use crate::errors::MapperError;
use crate::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Serialize an object into a row; the object must serialize to a JSON object
pub fn to_row<S: Serialize + ?Sized>(object: &S) -> Result<Row, MapperError> {
    match serde_json::to_value(object)? {
        Value::Object(row) => Ok(row),
        other => Err(MapperError::Transform(format!(
            "expected an object to serialize to a row, got {}",
            json_kind(&other)
        ))),
    }
}

/// Deserialize a row into an object
pub fn from_row<D: DeserializeOwned>(row: Row) -> Result<D, MapperError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Conversion from a raw affected-row count
pub trait FromCount: Sized + Send {
    fn from_count(count: u64) -> Result<Self, MapperError>;
}

impl FromCount for u64 {
    fn from_count(count: u64) -> Result<Self, MapperError> {
        Ok(count)
    }
}

macro_rules! impl_from_count {
    ($($ty:ty),*) => {
        $(
            impl FromCount for $ty {
                fn from_count(count: u64) -> Result<Self, MapperError> {
                    <$ty>::try_from(count).map_err(|_| {
                        MapperError::Transform(format!(
                            "row count {} does not fit in {}",
                            count,
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

impl_from_count!(i64, usize, u32);

impl FromCount for String {
    fn from_count(count: u64) -> Result<Self, MapperError> {
        Ok(count.to_string())
    }
}

/// Transform hooks applied around every mapper query
pub trait RowTransforms: Send + Sync + 'static {
    /// Object returned by selects
    type Selected: DeserializeOwned + Send;
    /// Object accepted by inserts
    type Insertable: Serialize + Send + Sync;
    /// Object accepted by updates
    type Updating: Serialize + Send + Sync;
    /// Object returned by inserts with return columns
    type InsertReturn: DeserializeOwned + Send;
    /// Object returned by updates with return columns
    type UpdateReturn: DeserializeOwned + Send;
    /// Representation of affected-row counts
    type Count: FromCount;

    /// Insertable object to row; `columns` is the subset in force, if any
    fn insert_transform(
        &self,
        object: &Self::Insertable,
        _columns: Option<&[String]>,
    ) -> Result<Row, MapperError> {
        to_row(object)
    }

    /// Returned row of an insert to the caller-facing result
    fn insert_return_transform(
        &self,
        _source: &Self::Insertable,
        returns: Row,
    ) -> Result<Self::InsertReturn, MapperError> {
        from_row(returns)
    }

    fn update_transform(
        &self,
        object: &Self::Updating,
        _columns: Option<&[String]>,
    ) -> Result<Row, MapperError> {
        to_row(object)
    }

    fn update_return_transform(
        &self,
        _source: &Self::Updating,
        returns: Row,
    ) -> Result<Self::UpdateReturn, MapperError> {
        from_row(returns)
    }

    fn select_transform(&self, row: Row) -> Result<Self::Selected, MapperError> {
        from_row(row)
    }

    fn count_transform(&self, count: u64) -> Result<Self::Count, MapperError> {
        <Self::Count as FromCount>::from_count(count)
    }
}

/// Rows in, rows out, counts as `u64`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransforms;

impl RowTransforms for NoTransforms {
    type Selected = Row;
    type Insertable = Row;
    type Updating = Row;
    type InsertReturn = Row;
    type UpdateReturn = Row;
    type Count = u64;

    fn insert_transform(&self, object: &Row, _columns: Option<&[String]>) -> Result<Row, MapperError> {
        Ok(object.clone())
    }

    fn insert_return_transform(&self, _source: &Row, returns: Row) -> Result<Row, MapperError> {
        Ok(returns)
    }

    fn update_transform(&self, object: &Row, _columns: Option<&[String]>) -> Result<Row, MapperError> {
        Ok(object.clone())
    }

    fn update_return_transform(&self, _source: &Row, returns: Row) -> Result<Row, MapperError> {
        Ok(returns)
    }

    fn select_transform(&self, row: Row) -> Result<Row, MapperError> {
        Ok(row)
    }
}
