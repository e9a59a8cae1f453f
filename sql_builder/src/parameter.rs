//! Statement parameters
//!
//! Every value slot in a statement is a [`Parameter`]: either a concrete value
//! or a placeholder that is filled in when a compiled statement is executed.

use crate::column_types::ColumnType;
use serde_json::Value;
use std::fmt;

/// Opaque marker standing in for a value inside a compiled statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Filled from the data object passed to each execution
    Column(String),
    /// Filled from the parameters object passed to each execution
    Param(String),
}

impl Placeholder {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Placeholder::Column(name) | Placeholder::Param(name) => name,
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Column(name) => write!(f, "column placeholder '{}'", name),
            Placeholder::Param(name) => write!(f, "parameter placeholder '{}'", name),
        }
    }
}

/// A value slot in a statement
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Value(Value),
    Placeholder(Placeholder),
}

impl Parameter {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Parameter::Value(value) => Some(value),
            Parameter::Placeholder(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Parameter::Value(Value::Null))
    }
}

impl From<Value> for Parameter {
    fn from(value: Value) -> Self {
        Parameter::Value(value)
    }
}

impl From<Placeholder> for Parameter {
    fn from(placeholder: Placeholder) -> Self {
        Parameter::Placeholder(placeholder)
    }
}

macro_rules! impl_parameter_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Parameter {
                fn from(value: $ty) -> Self {
                    Parameter::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_parameter_from_scalar!(&str, String, bool, i32, i64, u32, u64, f64);

/// Parameters of a statement in `$n` order
///
/// Each entry remembers the declared type of the column it is bound to, and
/// whether it is the operand of an `=`/`!=` comparison. A placeholder in that
/// position must not resolve to null: a literal null compiles to `IS NULL`,
/// which a placeholder cannot do after the fact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    parameters: Vec<Parameter>,
    types: Vec<Option<ColumnType>>,
    compared: Vec<bool>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter and return its marker, `$n` or `$n::type`
    pub fn push(&mut self, parameter: Parameter, column_type: Option<&ColumnType>) -> String {
        self.push_entry(parameter, column_type, false)
    }

    /// Append the operand of an equality comparison
    pub fn push_compared(&mut self, parameter: Parameter, column_type: Option<&ColumnType>) -> String {
        self.push_entry(parameter, column_type, true)
    }

    fn push_entry(
        &mut self,
        parameter: Parameter,
        column_type: Option<&ColumnType>,
        compared: bool,
    ) -> String {
        self.parameters.push(parameter);
        self.types.push(column_type.cloned());
        self.compared.push(compared);

        match column_type {
            Some(column_type) => format!("${}::{}", self.parameters.len(), column_type),
            None => format!("${}", self.parameters.len()),
        }
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn types(&self) -> &[Option<ColumnType>] {
        &self.types
    }

    pub fn is_compared(&self, index: usize) -> bool {
        self.compared.get(index).copied().unwrap_or(false)
    }
}
