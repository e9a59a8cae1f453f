use crate::parameter::Placeholder;
use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Invalid identifier: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown comparison operator '{0}'")]
    UnknownOperator(String),

    #[error("Operator {operator} on column '{column}' requires a value")]
    MissingOperand { column: String, operator: String },

    #[error("Operator {operator} on column '{column}' requires a list of values")]
    ExpectedList { column: String, operator: String },

    #[error("Invalid column selection '{0}'")]
    InvalidSelection(String),

    #[error("Raw expression expects {expected} parameters but received {actual}")]
    RawParameterMismatch { expected: usize, actual: usize },

    #[error("{0} is null but compared with = or !=; filter with IS NULL instead")]
    NullComparison(Placeholder),

    #[error("{0} was not resolved before execution")]
    UnresolvedPlaceholder(Placeholder),

    #[error("Update of table '{0}' has no columns to set")]
    EmptyUpdate(String),

    #[error("Insert into table '{0}' has no rows")]
    EmptyInsert(String),

    #[error("Insert into table '{0}' has several rows but no columns")]
    ColumnlessRows(String),
}
