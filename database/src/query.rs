//! SQL text for the `scheduler` table and the filter-to-query compiler.
//!
//! Filter values are never interpolated into SQL. Each predicate pushes its
//! values onto the argument list and takes its `$n` placeholder from the
//! list's new length, so placeholder numbering and argument order cannot
//! drift apart.

use scheduler_core::models::Filter;
use sqlx::{postgres::PgArguments, query::Query, Postgres};

pub const TASK_TABLE: &str = "scheduler";
pub const TASK_COLUMNS: &str = "id, date, title, comment, repeat";

pub const INSERT_TASK: &str =
    "INSERT INTO scheduler (date, title, comment, repeat) VALUES ($1, $2, $3, $4) RETURNING id";
pub const UPDATE_TASK: &str =
    "UPDATE scheduler SET date = $1, title = $2, comment = $3, repeat = $4 WHERE id = $5";
pub const DELETE_TASK: &str = "DELETE FROM scheduler WHERE id = $1";
pub const PING: &str = "SELECT 1";

/// A positional argument of a compiled statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryArg {
    Int(i64),
    Text(String),
}

/// Parameterized SELECT produced from a [`Filter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    sql: String,
    args: Vec<QueryArg>,
}

impl FilterQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[QueryArg] {
        &self.args
    }

    /// Placeholder numbers in the order they appear in the SQL text
    pub fn placeholders(&self) -> Vec<usize> {
        let bytes = self.sql.as_bytes();
        let mut found = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if let Ok(n) = self.sql[start..end].parse() {
                    found.push(n);
                }
                i = end;
            } else {
                i += 1;
            }
        }
        found
    }

    /// Bind the arguments, in order, onto an executable query
    pub fn build(&self) -> Query<'_, Postgres, PgArguments> {
        let mut query = sqlx::query(&self.sql);
        for arg in &self.args {
            query = match arg {
                QueryArg::Int(value) => query.bind(*value),
                QueryArg::Text(value) => query.bind(value.as_str()),
            };
        }
        query
    }
}

/// Clause list and argument list, grown side by side
#[derive(Default)]
struct Predicates {
    clauses: Vec<String>,
    args: Vec<QueryArg>,
}

impl Predicates {
    /// Record an argument and return its placeholder
    fn bind(&mut self, arg: QueryArg) -> String {
        self.args.push(arg);
        format!("${}", self.args.len())
    }
}

/// Compile a filter into a parameterized SELECT over the task columns.
///
/// Predicates are appended in a fixed order (id, search term, date) and joined
/// with AND; rows are ordered by date ascending with id breaking ties, and a
/// positive limit becomes the trailing `LIMIT` argument.
pub fn compile_filter(filter: &Filter) -> FilterQuery {
    let mut p = Predicates::default();

    if let Some(id) = filter.id {
        let id_ph = p.bind(QueryArg::Int(id));
        p.clauses.push(format!("id = {id_ph}"));
    }

    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        let title_ph = p.bind(QueryArg::Text(pattern.clone()));
        let comment_ph = p.bind(QueryArg::Text(pattern));
        p.clauses
            .push(format!("(title ILIKE {title_ph} OR comment ILIKE {comment_ph})"));
    }

    if let Some(date) = filter.date() {
        let date_ph = p.bind(QueryArg::Text(date.to_string()));
        p.clauses.push(format!("date = {date_ph}"));
    }

    let mut sql = format!("SELECT {TASK_COLUMNS} FROM {TASK_TABLE}");
    if !p.clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&p.clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY date, id");

    if let Some(limit) = filter.effective_limit() {
        let limit_ph = p.bind(QueryArg::Int(limit));
        sql.push_str(" LIMIT ");
        sql.push_str(&limit_ph);
    }

    FilterQuery { sql, args: p.args }
}

/// `%term%` with LIKE metacharacters escaped so the term matches literally
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
