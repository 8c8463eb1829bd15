//! Builder pattern implementations for easy test data construction
//!
//! Provides fluent builders for:
//! - Task construction with sensible defaults
//! - TaskInput patches
//! - Filter construction for query testing

use scheduler_core::{Filter, Task, TaskInput};

/// Builder for constructing Task instances in tests
pub struct TaskBuilder {
    task: Task,
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBuilder {
    /// Create new builder with default values
    pub fn new() -> Self {
        Self {
            task: Task {
                id: 0,
                date: "2024-01-01".to_string(),
                title: "Test Task".to_string(),
                comment: String::new(),
                repeat: String::new(),
            },
        }
    }

    /// Set task ID
    pub fn with_id(mut self, id: i64) -> Self {
        self.task.id = id;
        self
    }

    /// Set task date
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.task.date = date.into();
        self
    }

    /// Set task title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.task.title = title.into();
        self
    }

    /// Set task comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.task.comment = comment.into();
        self
    }

    /// Set recurrence rule
    pub fn with_repeat(mut self, repeat: impl Into<String>) -> Self {
        self.task.repeat = repeat.into();
        self
    }

    /// Build the final Task
    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for constructing TaskInput patches in tests
///
/// Starts with every field absent.
#[derive(Default)]
pub struct TaskInputBuilder {
    input: TaskInput,
}

impl TaskInputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.input.id = Some(id);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.input.date = Some(date.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.input.title = Some(title.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.input.comment = Some(comment.into());
        self
    }

    pub fn with_repeat(mut self, repeat: impl Into<String>) -> Self {
        self.input.repeat = Some(repeat.into());
        self
    }

    pub fn build(self) -> TaskInput {
        self.input
    }
}

/// Builder for constructing Filter instances in tests
#[derive(Default)]
pub struct FilterBuilder {
    filter: Filter,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: i64) -> Self {
        self.filter.id = Some(id);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.filter.search_term = Some(term.into());
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.filter.date = Some(date.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.filter.limit = limit;
        self
    }

    pub fn build(self) -> Filter {
        self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder_defaults() {
        let task = TaskBuilder::new().build();
        assert_eq!(task.id, 0);
        assert_eq!(task.date, "2024-01-01");
        assert_eq!(task.title, "Test Task");
    }

    #[test]
    fn test_task_input_builder_only_sets_given_fields() {
        let input = TaskInputBuilder::new().with_title("T").with_comment("").build();
        assert_eq!(input.title.as_deref(), Some("T"));
        assert_eq!(input.comment.as_deref(), Some(""));
        assert!(input.date.is_none());
        assert!(input.repeat.is_none());
        assert!(input.id.is_none());
    }

    #[test]
    fn test_filter_builder() {
        let filter = FilterBuilder::new().id(1).search("milk").date("2024-01-01").limit(3).build();
        assert_eq!(filter, Filter::by_id(1).with_search("milk").with_date("2024-01-01").with_limit(3));
    }
}
