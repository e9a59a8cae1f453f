//! Compiled statements
//!
//! A [`CompiledQuery`] is immutable SQL text plus its ordered parameter list.
//! Placeholders in the list are resolved per execution into a [`BoundQuery`];
//! the SQL text itself is shared and never rebuilt.

use crate::column_types::ColumnType;
use crate::errors::BuildError;
use crate::parameter::{Parameter, ParameterList, Placeholder};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CompiledQuery {
    sql: Arc<str>,
    parameters: ParameterList,
    returns_rows: bool,
}

impl CompiledQuery {
    pub fn new(sql: String, parameters: ParameterList, returns_rows: bool) -> Self {
        Self {
            sql: Arc::from(sql),
            parameters,
            returns_rows,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.parameters.parameters()
    }

    /// Declared column type of each parameter, `None` where undeclared
    pub fn parameter_types(&self) -> &[Option<ColumnType>] {
        self.parameters.types()
    }

    /// True when execution yields rows (one JSON document per row)
    pub fn returns_rows(&self) -> bool {
        self.returns_rows
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.parameters().iter().filter_map(|parameter| match parameter {
            Parameter::Placeholder(placeholder) => Some(placeholder),
            Parameter::Value(_) => None,
        })
    }

    pub fn has_placeholders(&self) -> bool {
        self.placeholders().next().is_some()
    }

    /// Walk the parameter list, filling every placeholder through `resolver`
    ///
    /// A placeholder compared with `=` or `!=` that resolves to null is
    /// rejected with [`BuildError::NullComparison`].
    pub fn resolve<E, F>(&self, mut resolver: F) -> Result<BoundQuery, E>
    where
        E: From<BuildError>,
        F: FnMut(&Placeholder) -> Result<Value, E>,
    {
        let mut values = Vec::with_capacity(self.parameters.len());
        for (index, parameter) in self.parameters().iter().enumerate() {
            match parameter {
                Parameter::Value(value) => values.push(value.clone()),
                Parameter::Placeholder(placeholder) => {
                    let value = resolver(placeholder)?;
                    if value.is_null() && self.parameters.is_compared(index) {
                        return Err(BuildError::NullComparison(placeholder.clone()).into());
                    }
                    values.push(value);
                }
            }
        }

        Ok(BoundQuery {
            sql: Arc::clone(&self.sql),
            values,
            types: self.parameters.types().to_vec(),
            returns_rows: self.returns_rows,
        })
    }

    /// Bind a statement that carries only concrete values
    pub fn into_bound(self) -> Result<BoundQuery, BuildError> {
        self.resolve(|placeholder| Err(BuildError::UnresolvedPlaceholder(placeholder.clone())))
    }
}

/// SQL text with every parameter resolved to a value, ready to execute
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    sql: Arc<str>,
    values: Vec<Value>,
    types: Vec<Option<ColumnType>>,
    returns_rows: bool,
}

impl BoundQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Values paired with the declared type of their column
    pub fn typed_values(&self) -> impl Iterator<Item = (&Value, Option<&ColumnType>)> {
        self.values
            .iter()
            .zip(self.types.iter().map(Option::as_ref))
    }

    pub fn returns_rows(&self) -> bool {
        self.returns_rows
    }
}
