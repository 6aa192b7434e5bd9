//! Read-only statement guard.
//!
//! Uses sqlparser-rs with the PostgreSQL dialect to reject anything other
//! than plain queries before it reaches a session. Data-modifying CTEs and
//! subqueries are rejected as well.

use sqlparser::ast::{Query, Select, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::error::{DashboardError, Result};

/// Fails with a query error unless `sql` is exactly one read-only query.
pub fn ensure_read_only(sql: &str) -> Result<()> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| DashboardError::query(format!("SQL parse error: {e}")))?;

    match statements.as_slice() {
        [Statement::Query(query)] if is_read_only_query(query) => Ok(()),
        [_] => Err(DashboardError::query(
            "Refusing to run a statement that is not a read-only query",
        )),
        [] => Err(DashboardError::query("Empty SQL statement")),
        _ => Err(DashboardError::query(format!(
            "Expected a single statement, found {}",
            statements.len()
        ))),
    }
}

fn is_read_only_query(query: &Query) -> bool {
    let ctes_read_only = query
        .with
        .as_ref()
        .map(|with| with.cte_tables.iter().all(|cte| is_read_only_query(&cte.query)))
        .unwrap_or(true);

    ctes_read_only && is_read_only_set_expr(&query.body)
}

fn is_read_only_set_expr(set_expr: &SetExpr) -> bool {
    match set_expr {
        SetExpr::Select(select) => is_read_only_select(select),
        SetExpr::Query(query) => is_read_only_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            is_read_only_set_expr(left) && is_read_only_set_expr(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => true,
        // INSERT/UPDATE/DELETE/MERGE bodies
        _ => false,
    }
}

fn is_read_only_select(select: &Select) -> bool {
    select.from.iter().all(is_read_only_table_with_joins)
}

fn is_read_only_table_with_joins(twj: &TableWithJoins) -> bool {
    is_read_only_table_factor(&twj.relation)
        && twj
            .joins
            .iter()
            .all(|join| is_read_only_table_factor(&join.relation))
}

fn is_read_only_table_factor(factor: &TableFactor) -> bool {
    match factor {
        TableFactor::Derived { subquery, .. } => is_read_only_query(subquery),
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => is_read_only_table_with_joins(table_with_joins),
        _ => true,
    }
}
