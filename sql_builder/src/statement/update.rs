use crate::column_types::ColumnTypes;
use crate::columns::Returning;
use crate::compiled::CompiledQuery;
use crate::errors::BuildError;
use crate::expr::Expr;
use crate::parameter::{Parameter, ParameterList};
use crate::sql_generation::SqlGenerator;
use crate::statement::{ReturningStatement, Statement};
use crate::validation::validate_identifier;
use crate::Row;

/// Type of update operation to perform on a field
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOperation {
    /// Set field to a specific value: field = $N
    Set(Parameter),

    /// Increment field by a value: field = field + $N
    Increment(Parameter),

    /// Decrement field by a value: field = field - $N
    Decrement(Parameter),

    /// Multiply field by a value: field = field * $N
    Multiply(Parameter),

    /// Divide field by a value: field = field / $N
    Divide(Parameter),
}

impl UpdateOperation {
    /// Generate the SQL assignment for this operation
    pub fn to_sql(&self, field_name: &str, param: &str) -> String {
        match self {
            UpdateOperation::Set(_) => format!("{} = {}", field_name, param),
            UpdateOperation::Increment(_) => {
                format!("{} = {} + {}", field_name, field_name, param)
            }
            UpdateOperation::Decrement(_) => {
                format!("{} = {} - {}", field_name, field_name, param)
            }
            UpdateOperation::Multiply(_) => {
                format!("{} = {} * {}", field_name, field_name, param)
            }
            UpdateOperation::Divide(_) => {
                format!("{} = {} / {}", field_name, field_name, param)
            }
        }
    }

    pub fn parameter(&self) -> &Parameter {
        match self {
            UpdateOperation::Set(p)
            | UpdateOperation::Increment(p)
            | UpdateOperation::Decrement(p)
            | UpdateOperation::Multiply(p)
            | UpdateOperation::Divide(p) => p,
        }
    }
}

/// UPDATE statement builder
///
/// Assignments keep the order they were added in; assigning the same column
/// twice replaces the earlier operation.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    pub(crate) table: String,
    pub(crate) operations: Vec<(String, UpdateOperation)>,
    pub(crate) conditions: Vec<Expr>,
    pub(crate) returning: Returning,
    pub(crate) column_types: ColumnTypes,
}

impl UpdateQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            operations: Vec::new(),
            conditions: Vec::new(),
            returning: Returning::Nothing,
            column_types: ColumnTypes::new(),
        }
    }

    /// Declared column types; parameters for these columns are cast
    pub fn with_column_types(mut self, column_types: ColumnTypes) -> Self {
        self.column_types = column_types;
        self
    }

    fn push_operation(mut self, field: impl Into<String>, operation: UpdateOperation) -> Self {
        let field = field.into();
        match self.operations.iter_mut().find(|(name, _)| *name == field) {
            Some(existing) => existing.1 = operation,
            None => self.operations.push((field, operation)),
        }
        self
    }

    /// Set a field to a specific value
    pub fn set(self, field: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.push_operation(field, UpdateOperation::Set(value.into()))
    }

    /// Set every column of a row
    pub fn set_row(self, row: Row) -> Self {
        row.into_iter()
            .fold(self, |query, (column, value)| query.set(column, value))
    }

    /// Increment a field by a value (atomic: field = field + value)
    pub fn increment(self, field: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.push_operation(field, UpdateOperation::Increment(value.into()))
    }

    /// Decrement a field by a value (atomic: field = field - value)
    pub fn decrement(self, field: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.push_operation(field, UpdateOperation::Decrement(value.into()))
    }

    /// Multiply a field by a value (atomic: field = field * value)
    pub fn multiply(self, field: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.push_operation(field, UpdateOperation::Multiply(value.into()))
    }

    /// Divide a field by a value (atomic: field = field / value)
    pub fn divide(self, field: impl Into<String>, value: impl Into<Parameter>) -> Self {
        self.push_operation(field, UpdateOperation::Divide(value.into()))
    }

    pub fn filter(mut self, filter: Expr) -> Self {
        self.conditions.push(filter);
        self
    }

    pub fn returning(self, returning: Returning) -> Self {
        self.with_returning(returning)
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Statement for UpdateQuery {
    fn table(&self) -> &str {
        &self.table
    }

    fn compile(&self) -> Result<CompiledQuery, BuildError> {
        let table = SqlGenerator::validated_table(&self.table)?;
        if self.operations.is_empty() {
            return Err(BuildError::EmptyUpdate(self.table.clone()));
        }

        // SET parameters are numbered before WHERE parameters
        let mut parameters = ParameterList::new();
        let mut assignments = Vec::with_capacity(self.operations.len());
        for (field, operation) in &self.operations {
            validate_identifier(field)?;
            let param = parameters.push(
                operation.parameter().clone(),
                self.column_types.get(field),
            );
            assignments.push(operation.to_sql(field, &param));
        }

        let where_clause = SqlGenerator::build_where_clause(
            &self.conditions,
            &self.column_types,
            &mut parameters,
        )?;
        let returning_clause = self.returning.to_sql()?;
        let sql = SqlGenerator::join_clauses(&[
            &format!("UPDATE {} SET {}", table, assignments.join(", ")),
            &where_clause,
            &returning_clause,
        ]);
        crate::trace_log!("Compiled UPDATE on {}: {}", self.table, sql);

        if self.returning.returns_rows() {
            Ok(CompiledQuery::new(
                SqlGenerator::wrap_returning_as_json(&sql),
                parameters,
                true,
            ))
        } else {
            Ok(CompiledQuery::new(sql, parameters, false))
        }
    }
}

impl ReturningStatement for UpdateQuery {
    fn set_returning(&mut self, returning: Returning) {
        self.returning = returning;
    }
}
