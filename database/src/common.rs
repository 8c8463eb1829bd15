use scheduler_core::{
    error::TaskError,
    models::Task,
};
use sqlx::{postgres::PgRow, Row};

/// Convert a PostgreSQL row to a Task model
///
/// Every one of the five columns must decode; a single failure fails the row.
pub fn row_to_task(row: &PgRow) -> Result<Task, sqlx::Error> {
    Ok(Task {
        id: row.try_get("id")?,
        date: row.try_get("date")?,
        title: row.try_get("title")?,
        comment: row.try_get("comment")?,
        repeat: row.try_get("repeat")?,
    })
}

/// Convert SQLx error to TaskError
///
/// Engine-reported failures keep their message and SQLSTATE; nothing is
/// reinterpreted except cancellation, which is handled by the caller's context.
pub fn sqlx_error_to_task_error(err: sqlx::Error) -> TaskError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => TaskError::Database(format!("{} (SQLSTATE {code})", db_err.message())),
            None => TaskError::Database(db_err.message().to_string()),
        },
        sqlx::Error::ColumnDecode { index, source } => {
            TaskError::Database(format!("Failed to decode column {index}: {source}"))
        }
        sqlx::Error::ColumnNotFound(column) => {
            TaskError::Database(format!("Column not found: {column}"))
        }
        sqlx::Error::PoolTimedOut => TaskError::Database("Connection pool timeout".to_string()),
        sqlx::Error::PoolClosed => TaskError::Database("Connection pool is closed".to_string()),
        sqlx::Error::Io(io_err) => TaskError::Database(format!("Database I/O error: {io_err}")),
        _ => TaskError::Database(format!("Database operation failed: {err}")),
    }
}
