//! Standard test fixtures for consistent testing
//!
//! Provides pre-built test data including:
//! - The "milk" rows used to check search plus limit
//! - Standard tasks and patches
//! - Bulk task generators

use scheduler_core::{Task, TaskInput};

/// Create a basic unsaved test task
pub fn create_test_task() -> Task {
    Task::default()
        .with_date("2024-05-01")
        .with_title("X")
}

/// Create a stored test task with the given id
pub fn create_stored_task(id: i64) -> Task {
    create_test_task().with_id(id)
}

/// Three rows where "milk" appears in two titles and one comment
///
/// Unsaved; dates ascend in the order given.
pub fn milk_tasks() -> Vec<Task> {
    vec![
        Task::default().with_date("2024-01-01").with_title("Buy milk"),
        Task::default().with_date("2024-01-02").with_title("Milkshake"),
        Task::default()
            .with_date("2024-01-03")
            .with_title("Bread")
            .with_comment("buy milk"),
    ]
}

/// Create multiple unique unsaved tasks with ascending dates
pub fn create_test_tasks(count: usize) -> Vec<Task> {
    (1..=count)
        .map(|i| {
            Task::default()
                .with_date(format!("2024-{:02}-{:02}", (i - 1) / 28 % 12 + 1, (i - 1) % 28 + 1))
                .with_title(format!("Test Task {i}"))
                .with_comment(format!("Test task number {i} for bulk testing"))
                .with_repeat(if i % 3 == 0 { "d 7" } else { "" })
        })
        .collect()
}

/// A patch that only changes the title
pub fn create_title_patch(title: &str) -> TaskInput {
    TaskInput {
        title: Some(title.to_string()),
        ..Default::default()
    }
}
