//! Custom assertion helpers for testing
//!
//! Provides specialized assertions for:
//! - Task equality with clear error messages
//! - Result ordering and filter conformance
//! - Error kinds

use scheduler_core::{Filter, Result, Task, TaskError};

use crate::repository::matches_filter;

/// Assert tasks are equal ignoring the id
pub fn assert_task_fields_eq(actual: &Task, expected: &Task) {
    assert_eq!(actual.date, expected.date, "Task dates don't match");
    assert_eq!(actual.title, expected.title, "Task titles don't match");
    assert_eq!(actual.comment, expected.comment, "Task comments don't match");
    assert_eq!(actual.repeat, expected.repeat, "Task repeat rules don't match");
}

/// Assert tasks are ordered by date ascending
pub fn assert_sorted_by_date(tasks: &[Task]) {
    for pair in tasks.windows(2) {
        assert!(
            pair[0].date <= pair[1].date,
            "Tasks out of date order: {} ({}) before {} ({})",
            pair[0].id,
            pair[0].date,
            pair[1].id,
            pair[1].date
        );
    }
}

/// Assert every task satisfies the filter's predicates and limit
pub fn assert_matches_filter(tasks: &[Task], filter: &Filter) {
    if let Some(limit) = filter.effective_limit() {
        assert!(
            tasks.len() as i64 <= limit,
            "Expected at most {limit} tasks, got {}",
            tasks.len()
        );
    }
    for task in tasks {
        assert!(
            matches_filter(filter, task),
            "Task {task:?} does not match filter {filter:?}"
        );
    }
}

/// Assert `prefix` is a prefix of `full`, comparing ids
pub fn assert_prefix_of(prefix: &[Task], full: &[Task]) {
    let prefix_ids: Vec<i64> = prefix.iter().map(|t| t.id).collect();
    let full_ids: Vec<i64> = full.iter().take(prefix.len()).map(|t| t.id).collect();
    assert_eq!(prefix_ids, full_ids, "Limited result is not a prefix of the full result");
}

/// Assert the result failed with the not-found kind
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T>) {
    match result {
        Err(TaskError::NotFound(_)) => {}
        other => panic!("Expected NotFound error, got: {other:?}"),
    }
}
