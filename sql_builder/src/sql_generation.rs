//! SQL text generation
//!
//! Renders expressions and clauses into PostgreSQL text. Parameters are
//! appended to a shared list as they are encountered, so `$n` numbering always
//! follows textual order. A parameter compared with a column whose type is
//! declared is rendered with a cast to that type.

use crate::column_types::ColumnTypes;
use crate::errors::BuildError;
use crate::expr::{Expr, LogicalOperator, QueryCondition, QueryOperator};
use crate::ordering::SortOrder;
use crate::parameter::{Parameter, ParameterList};
use crate::validation::{validate_column_reference, validate_identifier};
use serde_json::Value;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from conditions (combined with AND)
    pub fn build_where_clause(
        conditions: &[Expr],
        types: &ColumnTypes,
        parameters: &mut ParameterList,
    ) -> Result<String, BuildError> {
        if conditions.is_empty() {
            return Ok(String::new());
        }

        let mut parts = Vec::with_capacity(conditions.len());
        for condition in conditions {
            parts.push(Self::build_expr_sql(condition, types, parameters)?);
        }

        Ok(format!("WHERE {}", parts.join(" AND ")))
    }

    pub fn build_expr_sql(
        expr: &Expr,
        types: &ColumnTypes,
        parameters: &mut ParameterList,
    ) -> Result<String, BuildError> {
        match expr {
            Expr::Condition(condition) => Self::build_condition_sql(condition, types, parameters),
            Expr::Group { operator, filters } => {
                if filters.is_empty() {
                    // Empty AND is vacuously true, empty OR matches nothing
                    return Ok(match operator {
                        LogicalOperator::And => "TRUE".to_string(),
                        LogicalOperator::Or => "FALSE".to_string(),
                    });
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let mut parts = Vec::with_capacity(filters.len());
                for filter in filters {
                    parts.push(Self::build_expr_sql(filter, types, parameters)?);
                }

                Ok(format!("({})", parts.join(operator_str)))
            }
            Expr::Not(inner) => Ok(format!(
                "NOT ({})",
                Self::build_expr_sql(inner, types, parameters)?
            )),
            Expr::Raw {
                sql,
                parameters: raw_parameters,
            } => Self::build_raw_sql(sql, raw_parameters, parameters),
            Expr::True => Ok("TRUE".to_string()),
        }
    }

    fn build_condition_sql(
        condition: &QueryCondition,
        types: &ColumnTypes,
        parameters: &mut ParameterList,
    ) -> Result<String, BuildError> {
        let field = &condition.field;
        validate_column_reference(field)?;
        let column_type = types.get(field);

        match condition.operator {
            QueryOperator::IsNull => return Ok(format!("{} IS NULL", field)),
            QueryOperator::IsNotNull => return Ok(format!("{} IS NOT NULL", field)),
            _ => {}
        }

        let value = condition
            .value
            .as_ref()
            .ok_or_else(|| BuildError::MissingOperand {
                column: field.clone(),
                operator: condition.operator.to_string(),
            })?;

        match condition.operator {
            QueryOperator::Eq if value.is_null() => Ok(format!("{} IS NULL", field)),
            QueryOperator::Ne if value.is_null() => Ok(format!("{} IS NOT NULL", field)),
            QueryOperator::In | QueryOperator::NotIn => {
                let list = match value {
                    Parameter::Value(Value::Array(list)) => list,
                    _ => {
                        return Err(BuildError::ExpectedList {
                            column: field.clone(),
                            operator: condition.operator.to_string(),
                        })
                    }
                };

                if list.is_empty() {
                    return Ok(match condition.operator {
                        QueryOperator::In => "1=0".to_string(),
                        _ => "1=1".to_string(),
                    });
                }

                let placeholders: Vec<String> = list
                    .iter()
                    .map(|item| parameters.push(Parameter::Value(item.clone()), column_type))
                    .collect();

                Ok(format!(
                    "{} {} ({})",
                    field,
                    condition.operator.to_sql(),
                    placeholders.join(", ")
                ))
            }
            QueryOperator::Eq | QueryOperator::Ne => {
                let param = parameters.push_compared(value.clone(), column_type);
                Ok(format!("{} {} {}", field, condition.operator.to_sql(), param))
            }
            operator => {
                let param = parameters.push(value.clone(), column_type);
                Ok(format!("{} {} {}", field, operator.to_sql(), param))
            }
        }
    }

    fn build_raw_sql(
        sql: &str,
        raw_parameters: &[Parameter],
        parameters: &mut ParameterList,
    ) -> Result<String, BuildError> {
        let expected = sql.matches('?').count();
        if expected != raw_parameters.len() {
            return Err(BuildError::RawParameterMismatch {
                expected,
                actual: raw_parameters.len(),
            });
        }

        let mut rendered = String::with_capacity(sql.len() + expected * 2);
        let mut remaining = raw_parameters.iter();
        for ch in sql.chars() {
            if ch != '?' {
                rendered.push(ch);
                continue;
            }
            if let Some(parameter) = remaining.next() {
                rendered.push_str(&parameters.push(parameter.clone(), None));
            }
        }

        Ok(format!("({})", rendered))
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[(String, SortOrder)]) -> Result<String, BuildError> {
        if order_by.is_empty() {
            return Ok(String::new());
        }

        let mut order_items = Vec::with_capacity(order_by.len());
        for (field, order) in order_by {
            validate_column_reference(field)?;
            order_items.push(format!("{} {}", field, order.to_sql()));
        }

        Ok(format!("ORDER BY {}", order_items.join(", ")))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset));
        }

        clauses.join(" ")
    }

    pub fn validated_table(table: &str) -> Result<&str, BuildError> {
        validate_identifier(table)?;
        Ok(table)
    }

    /// Join non-empty clauses with single spaces
    pub fn join_clauses(clauses: &[&str]) -> String {
        clauses
            .iter()
            .filter(|clause| !clause.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Wrap a SELECT so each result row arrives as one JSON document
    pub fn wrap_select_as_json(inner: &str) -> String {
        format!("SELECT to_jsonb(r) AS row FROM ({}) AS r", inner)
    }

    /// Wrap a data-modifying statement with RETURNING so each returned row
    /// arrives as one JSON document
    pub fn wrap_returning_as_json(inner: &str) -> String {
        format!("WITH r AS ({}) SELECT to_jsonb(r) AS row FROM r", inner)
    }
}
