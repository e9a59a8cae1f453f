use crate::column_types::ColumnTypes;
use crate::columns::Returning;
use crate::compiled::CompiledQuery;
use crate::errors::BuildError;
use crate::parameter::{Parameter, ParameterList};
use crate::sql_generation::SqlGenerator;
use crate::statement::{ReturningStatement, Statement};
use crate::validation::validate_identifier;
use crate::Row;

/// INSERT statement builder
///
/// Rows may carry different column sets. The statement's column list is the
/// union of all row columns in first-seen order; a row lacking one of them
/// inserts `DEFAULT` there.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    pub(crate) table: String,
    pub(crate) rows: Vec<Vec<(String, Parameter)>>,
    pub(crate) returning: Returning,
    pub(crate) column_types: ColumnTypes,
}

impl InsertQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            rows: Vec::new(),
            returning: Returning::Nothing,
            column_types: ColumnTypes::new(),
        }
    }

    /// Declared column types; parameters for these columns are cast
    pub fn with_column_types(mut self, column_types: ColumnTypes) -> Self {
        self.column_types = column_types;
        self
    }

    /// Append a row of column/parameter pairs
    pub fn row<I, P>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (String, P)>,
        P: Into<Parameter>,
    {
        self.rows.push(
            row.into_iter()
                .map(|(column, parameter)| (column, parameter.into()))
                .collect(),
        );
        self
    }

    /// Append a row of concrete values
    pub fn values(self, row: Row) -> Self {
        self.row(row)
    }

    pub fn returning(self, returning: Returning) -> Self {
        self.with_returning(returning)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for row in &self.rows {
            for (column, _) in row {
                if !columns.contains(&column.as_str()) {
                    columns.push(column);
                }
            }
        }
        columns
    }
}

impl Statement for InsertQuery {
    fn table(&self) -> &str {
        &self.table
    }

    fn compile(&self) -> Result<CompiledQuery, BuildError> {
        let table = SqlGenerator::validated_table(&self.table)?;
        if self.rows.is_empty() {
            return Err(BuildError::EmptyInsert(self.table.clone()));
        }

        let columns = self.columns();
        let mut parameters = ParameterList::new();

        let values_clause = if columns.is_empty() {
            if self.rows.len() > 1 {
                return Err(BuildError::ColumnlessRows(self.table.clone()));
            }
            "DEFAULT VALUES".to_string()
        } else {
            for column in &columns {
                validate_identifier(column)?;
            }

            let rendered_rows: Vec<String> = self
                .rows
                .iter()
                .map(|row| {
                    let cells: Vec<String> = columns
                        .iter()
                        .map(|column| {
                            match row.iter().find(|(name, _)| name.as_str() == *column) {
                                Some((_, parameter)) => parameters
                                    .push(parameter.clone(), self.column_types.get(column)),
                                None => "DEFAULT".to_string(),
                            }
                        })
                        .collect();
                    format!("({})", cells.join(", "))
                })
                .collect();

            format!("({}) VALUES {}", columns.join(", "), rendered_rows.join(", "))
        };

        let returning_clause = self.returning.to_sql()?;
        let sql = SqlGenerator::join_clauses(&[
            &format!("INSERT INTO {}", table),
            &values_clause,
            &returning_clause,
        ]);
        crate::trace_log!("Compiled INSERT of {} rows: {}", self.rows.len(), sql);

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

impl ReturningStatement for InsertQuery {
    fn set_returning(&mut self, returning: Returning) {
        self.returning = returning;
    }
}
