//! SQL rendering of record predicates.
//!
//! Both relational backends share the same statement shapes; only placeholder
//! syntax, the substring function and collation differ.

use crate::models::RecordField;
use crate::query::filter::{Condition, Predicate};
use crate::query::page::Window;

/// Name of the case-folding scalar function registered on SQLite connections
pub const SQLITE_FOLD_FUNCTION: &str = "fold_case";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::Sqlite => format!("?{}", index),
        }
    }

    /// Case-folded column expression. SQLite's UPPER is ASCII-only, so the
    /// SQLite pool registers `fold_case` as a scalar function instead.
    fn fold(self, column: &str) -> String {
        match self {
            Self::Postgres => format!("UPPER({})", column),
            Self::Sqlite => format!("{}({})", SQLITE_FOLD_FUNCTION, column),
        }
    }

    fn contains(self, column: &str, placeholder: &str) -> String {
        match self {
            Self::Postgres => format!("STRPOS({}, {}) > 0", self.fold(column), placeholder),
            Self::Sqlite => format!("INSTR({}, {}) > 0", self.fold(column), placeholder),
        }
    }

    fn order_key(self, column: &str) -> String {
        match self {
            Self::Postgres => format!("{} IS NULL, {} COLLATE \"C\"", column, column),
            Self::Sqlite => format!("{} IS NULL, {}", column, column),
        }
    }
}

/// Rendered WHERE clause with positional text parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub sql: String,
    pub params: Vec<String>,
}

/// Render a predicate. An empty predicate renders as a tautology.
pub fn build_where_clause(predicate: &Predicate, dialect: Dialect) -> WhereClause {
    if predicate.is_empty() {
        return WhereClause {
            sql: "1 = 1".to_string(),
            params: Vec::new(),
        };
    }

    let mut params = Vec::new();
    let clauses: Vec<String> = predicate
        .conditions()
        .iter()
        .map(|condition| build_condition(condition, dialect, &mut params))
        .collect();

    WhereClause {
        sql: clauses.join(" AND "),
        params,
    }
}

fn build_condition(condition: &Condition, dialect: Dialect, params: &mut Vec<String>) -> String {
    match condition {
        Condition::Equals { field, value } => {
            params.push(value.clone());
            let column = field.column();
            format!(
                "({} IS NOT NULL AND {} = {})",
                column,
                dialect.fold(column),
                dialect.placeholder(params.len())
            )
        }
        Condition::Contains { field, value } => {
            params.push(value.clone());
            let column = field.column();
            format!(
                "({} IS NOT NULL AND {})",
                column,
                dialect.contains(column, &dialect.placeholder(params.len()))
            )
        }
        Condition::ContainsAny { fields, value } => {
            params.push(value.clone());
            let placeholder = dialect.placeholder(params.len());
            let alternatives: Vec<String> = fields
                .iter()
                .map(|field| {
                    let column = field.column();
                    format!(
                        "({} IS NOT NULL AND {})",
                        column,
                        dialect.contains(column, &placeholder)
                    )
                })
                .collect();
            format!("({})", alternatives.join(" OR "))
        }
    }
}

/// Comma-separated column list in record field order
pub fn select_columns() -> String {
    RecordField::ALL
        .iter()
        .map(|f| f.column())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deterministic row order: member id, then family id, byte-wise, nulls last
pub fn order_by(dialect: Dialect) -> String {
    format!(
        "{}, {}",
        dialect.order_key(RecordField::MemberId.column()),
        dialect.order_key(RecordField::FamilyId.column())
    )
}

pub fn count_all_sql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", table)
}

pub fn count_matching_sql(table: &str, clause: &WhereClause) -> String {
    format!("SELECT COUNT(*) FROM {} WHERE {}", table, clause.sql)
}

/// Count of distinct non-empty values of `field` among matching rows
pub fn distinct_count_sql(table: &str, clause: &WhereClause, field: RecordField) -> String {
    let column = field.column();
    format!(
        "SELECT COUNT(DISTINCT {}) FROM {} WHERE {} AND {} IS NOT NULL AND {} <> ''",
        column, table, clause.sql, column, column
    )
}

pub fn page_sql(table: &str, clause: &WhereClause, window: Window, dialect: Dialect) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} LIMIT {} OFFSET {}",
        select_columns(),
        table,
        clause.sql,
        order_by(dialect),
        window.limit,
        window.offset
    )
}

/// Whether `name` is a plain or schema-qualified SQL identifier safe to interpolate
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
