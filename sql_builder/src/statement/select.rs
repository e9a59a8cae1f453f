use crate::column_types::ColumnTypes;
use crate::columns::Selection;
use crate::compiled::CompiledQuery;
use crate::errors::BuildError;
use crate::expr::Expr;
use crate::ordering::SortOrder;
use crate::parameter::ParameterList;
use crate::sql_generation::SqlGenerator;
use crate::statement::Statement;

/// SELECT statement builder
#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub(crate) table: String,
    pub(crate) selection: Selection,
    pub(crate) conditions: Vec<Expr>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
    pub(crate) column_types: ColumnTypes,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            selection: Selection::All,
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            column_types: ColumnTypes::new(),
        }
    }

    /// Declared column types; parameters for these columns are cast
    pub fn with_column_types(mut self, column_types: ColumnTypes) -> Self {
        self.column_types = column_types;
        self
    }

    /// Replace the projection
    pub fn select(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: Expr) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<Expr>) -> Self {
        self.conditions.extend(filters);
        self
    }

    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    /// The plain SELECT text, without JSON row wrapping
    pub fn to_sql(&self) -> Result<(String, ParameterList), BuildError> {
        let table = SqlGenerator::validated_table(&self.table)?;
        let mut parameters = ParameterList::new();

        let select_clause = format!("SELECT {} FROM {}", self.selection.to_sql()?, table);
        let where_clause = SqlGenerator::build_where_clause(
            &self.conditions,
            &self.column_types,
            &mut parameters,
        )?;
        let order_clause = SqlGenerator::build_order_clause(&self.order_by)?;
        let limit_clause = SqlGenerator::build_limit_clause(self.limit, self.offset);

        let sql = SqlGenerator::join_clauses(&[
            &select_clause,
            &where_clause,
            &order_clause,
            &limit_clause,
        ]);
        Ok((sql, parameters))
    }
}

impl Statement for SelectQuery {
    fn table(&self) -> &str {
        &self.table
    }

    fn compile(&self) -> Result<CompiledQuery, BuildError> {
        let (sql, parameters) = self.to_sql()?;
        crate::trace_log!("Compiled SELECT on {}: {}", self.table, sql);
        Ok(CompiledQuery::new(
            SqlGenerator::wrap_select_as_json(&sql),
            parameters,
            true,
        ))
    }
}
