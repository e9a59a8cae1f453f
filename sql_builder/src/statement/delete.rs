use crate::column_types::ColumnTypes;
use crate::columns::Returning;
use crate::compiled::CompiledQuery;
use crate::errors::BuildError;
use crate::expr::Expr;
use crate::parameter::ParameterList;
use crate::sql_generation::SqlGenerator;
use crate::statement::{ReturningStatement, Statement};

/// DELETE statement builder
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    pub(crate) table: String,
    pub(crate) conditions: Vec<Expr>,
    pub(crate) returning: Returning,
    pub(crate) column_types: ColumnTypes,
}

impl DeleteQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
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

    pub fn filter(mut self, filter: Expr) -> Self {
        self.conditions.push(filter);
        self
    }

    pub fn returning(self, returning: Returning) -> Self {
        self.with_returning(returning)
    }
}

impl Statement for DeleteQuery {
    fn table(&self) -> &str {
        &self.table
    }

    fn compile(&self) -> Result<CompiledQuery, BuildError> {
        let table = SqlGenerator::validated_table(&self.table)?;
        let mut parameters = ParameterList::new();

        let where_clause = SqlGenerator::build_where_clause(
            &self.conditions,
            &self.column_types,
            &mut parameters,
        )?;
        let returning_clause = self.returning.to_sql()?;
        let sql = SqlGenerator::join_clauses(&[
            &format!("DELETE FROM {}", table),
            &where_clause,
            &returning_clause,
        ]);
        crate::trace_log!("Compiled DELETE on {}: {}", self.table, sql);

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

impl ReturningStatement for DeleteQuery {
    fn set_returning(&mut self, returning: Returning) {
        self.returning = returning;
    }
}
