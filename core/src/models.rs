use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskError};

/// A scheduled task as stored in the `scheduler` table.
///
/// `id` is assigned by the database on create; `0` means the task has not
/// been stored yet. On the JSON boundary every field is optional, the id is
/// written as a string and accepted as either a string or a number.
///
/// # Examples
///
/// ```rust
/// use scheduler_core::models::Task;
///
/// let task = Task::default()
///     .with_date("2024-05-01")
///     .with_title("Pay rent")
///     .with_repeat("m 1");
///
/// assert_eq!(task.id, 0);
/// assert_eq!(task.title, "Pay rent");
/// assert!(task.comment.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Database-assigned identity
    #[serde(default, with = "id_format", skip_serializing_if = "is_unassigned")]
    pub id: i64,
    /// Calendar date, used for ordering and exact-match filtering
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date: String,
    /// Short task title
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Free-text comment
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Recurrence rule
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repeat: String,
}

fn is_unassigned(id: &i64) -> bool {
    *id == 0
}

impl Task {
    /// Build a task by applying overrides, in order, to a default task
    pub fn from_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = TaskOverride>,
    {
        let mut task = Task::default();
        for o in overrides {
            o.apply(&mut task);
        }
        task
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_repeat(mut self, repeat: impl Into<String>) -> Self {
        self.repeat = repeat.into();
        self
    }

    /// Whether the database has assigned an id to this task
    pub fn is_stored(&self) -> bool {
        self.id > 0
    }
}

/// A single field override carried by a [`TaskInput`] patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOverride {
    Id(i64),
    Date(String),
    Title(String),
    Comment(String),
    Repeat(String),
}

impl TaskOverride {
    /// Write this override into `task`
    pub fn apply(self, task: &mut Task) {
        match self {
            TaskOverride::Id(id) => task.id = id,
            TaskOverride::Date(date) => task.date = date,
            TaskOverride::Title(title) => task.title = title,
            TaskOverride::Comment(comment) => task.comment = comment,
            TaskOverride::Repeat(repeat) => task.repeat = repeat,
        }
    }
}

/// Sparse patch over a [`Task`].
///
/// `None` means the field was absent and must leave the target untouched;
/// `Some(String::new())` is a present, empty value that clears the field.
///
/// # Examples
///
/// ```rust
/// use scheduler_core::models::{Task, TaskInput};
///
/// let stored = Task::default().with_id(7).with_date("2024-01-01").with_title("Old");
/// let patch = TaskInput {
///     title: Some("New".to_string()),
///     comment: Some(String::new()),
///     ..Default::default()
/// };
///
/// let merged = patch.apply(stored);
/// assert_eq!(merged.id, 7);
/// assert_eq!(merged.date, "2024-01-01");
/// assert_eq!(merged.title, "New");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskInput {
    #[serde(default, with = "id_format::option", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
}

impl TaskInput {
    /// Overrides for the present fields, in field order
    pub fn overrides(&self) -> Vec<TaskOverride> {
        let mut overrides = Vec::new();
        if let Some(id) = self.id {
            overrides.push(TaskOverride::Id(id));
        }
        if let Some(ref date) = self.date {
            overrides.push(TaskOverride::Date(date.clone()));
        }
        if let Some(ref title) = self.title {
            overrides.push(TaskOverride::Title(title.clone()));
        }
        if let Some(ref comment) = self.comment {
            overrides.push(TaskOverride::Comment(comment.clone()));
        }
        if let Some(ref repeat) = self.repeat {
            overrides.push(TaskOverride::Repeat(repeat.clone()));
        }
        overrides
    }

    /// Apply the present fields on top of `base`
    pub fn apply(&self, mut base: Task) -> Task {
        for o in self.overrides() {
            o.apply(&mut base);
        }
        base
    }

    /// Build a fresh task from the present fields
    pub fn into_task(self) -> Task {
        Task::from_overrides(self.overrides())
    }

    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.date.is_none()
            && self.title.is_none()
            && self.comment.is_none()
            && self.repeat.is_none()
    }
}

/// Selection criteria for [`crate::repository::TaskRepository::find_task`].
///
/// Present predicates are combined with AND. Empty strings count as absent,
/// and a `limit` of zero or below means "no limit". Results are always
/// ordered by date ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Filter {
    /// Exact id match
    pub id: Option<i64>,
    /// Case-insensitive substring match against title or comment
    #[serde(alias = "search")]
    pub search_term: Option<String>,
    /// Exact date match
    pub date: Option<String>,
    /// Maximum number of rows
    pub limit: i64,
}

impl Filter {
    /// Filter that selects every task
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter that selects a single task by id
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Search term, if one is set and non-empty
    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|s| !s.is_empty())
    }

    /// Date predicate, if one is set and non-empty
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref().filter(|s| !s.is_empty())
    }

    /// Row limit, if positive
    pub fn effective_limit(&self) -> Option<i64> {
        (self.limit > 0).then_some(self.limit)
    }

    /// True when no predicate and no limit apply
    pub fn is_unrestricted(&self) -> bool {
        self.id.is_none()
            && self.search_term().is_none()
            && self.date().is_none()
            && self.effective_limit().is_none()
    }
}

/// Parse a task id as it arrives on the transport boundary
pub fn parse_task_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| TaskError::Validation(format!("Invalid task id: '{raw}'")))
}

mod id_format {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    fn resolve<E: de::Error>(raw: Option<RawId>) -> Result<Option<i64>, E> {
        match raw {
            None => Ok(None),
            Some(RawId::Number(id)) => Ok(Some(id)),
            Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
            Some(RawId::Text(text)) => super::parse_task_id(&text)
                .map(Some)
                .map_err(E::custom),
        }
    }

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(resolve(Option::<RawId>::deserialize(deserializer)?)?.unwrap_or_default())
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(id: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
            match id {
                Some(id) => super::serialize(id, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<i64>, D::Error> {
            resolve(Option::<RawId>::deserialize(deserializer)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_builder_overrides() {
        let task = Task::default()
            .with_id(3)
            .with_date("2024-01-02")
            .with_title("Milkshake")
            .with_comment("with straw")
            .with_repeat("d 7");

        assert_eq!(task.id, 3);
        assert_eq!(task.date, "2024-01-02");
        assert_eq!(task.title, "Milkshake");
        assert_eq!(task.comment, "with straw");
        assert_eq!(task.repeat, "d 7");
        assert!(task.is_stored());
        assert!(!Task::default().is_stored());
    }

    #[test]
    fn test_input_absent_fields_keep_stored_values() {
        let stored = Task::default()
            .with_id(1)
            .with_date("2024-01-01")
            .with_title("Buy milk")
            .with_comment("two bottles")
            .with_repeat("y");

        let patch = TaskInput {
            date: Some("2024-02-01".to_string()),
            ..Default::default()
        };
        let merged = patch.apply(stored.clone());

        assert_eq!(merged.date, "2024-02-01");
        assert_eq!(merged.id, stored.id);
        assert_eq!(merged.title, stored.title);
        assert_eq!(merged.comment, stored.comment);
        assert_eq!(merged.repeat, stored.repeat);
    }

    #[test]
    fn test_input_present_empty_clears_field() {
        let stored = Task::default().with_id(1).with_comment("old note");
        let patch = TaskInput {
            comment: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(patch.apply(stored).comment, "");
    }

    #[test]
    fn test_input_overrides_order_and_into_task() {
        let input = TaskInput {
            id: Some(9),
            date: Some("2024-03-03".to_string()),
            title: None,
            comment: Some("c".to_string()),
            repeat: None,
        };
        assert_eq!(
            input.overrides(),
            vec![
                TaskOverride::Id(9),
                TaskOverride::Date("2024-03-03".to_string()),
                TaskOverride::Comment("c".to_string()),
            ]
        );

        let task = input.into_task();
        assert_eq!(task, Task::default().with_id(9).with_date("2024-03-03").with_comment("c"));
        assert!(TaskInput::default().is_empty());
        assert_eq!(TaskInput::default().into_task(), Task::default());
    }

    #[test]
    fn test_task_json_boundary() {
        let task: Task = serde_json::from_str(r#"{"id":"42","date":"2024-05-01","title":"X"}"#).unwrap();
        assert_eq!(task.id, 42);
        assert_eq!(task.title, "X");
        assert!(task.repeat.is_empty());

        let numeric: Task = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(numeric.id, 42);

        let empty: Task = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Task::default());

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], "42");
        assert!(json.get("comment").is_none());

        let unstored = serde_json::to_value(Task::default().with_title("t")).unwrap();
        assert!(unstored.get("id").is_none());
    }

    #[test]
    fn test_task_input_json_distinguishes_absent_from_empty() {
        let input: TaskInput = serde_json::from_str(r#"{"id":"5","title":"","repeat":null}"#).unwrap();
        assert_eq!(input.id, Some(5));
        assert_eq!(input.title, Some(String::new()));
        assert_eq!(input.comment, None);
        assert_eq!(input.repeat, None);

        let bad = serde_json::from_str::<TaskInput>(r#"{"id":"abc"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_parse_task_id() {
        assert_eq!(parse_task_id(" 17 ").unwrap(), 17);
        let err = parse_task_id("seventeen").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_filter_helpers() {
        let filter = Filter::new();
        assert!(filter.is_unrestricted());
        assert_eq!(filter.effective_limit(), None);

        let filter = Filter::new().with_search("").with_date("").with_limit(-3);
        assert!(filter.is_unrestricted());
        assert_eq!(filter.search_term(), None);
        assert_eq!(filter.date(), None);

        let filter = Filter::by_id(4).with_search("milk").with_date("2024-01-01").with_limit(2);
        assert_eq!(filter.id, Some(4));
        assert_eq!(filter.search_term(), Some("milk"));
        assert_eq!(filter.date(), Some("2024-01-01"));
        assert_eq!(filter.effective_limit(), Some(2));
        assert!(!filter.is_unrestricted());
    }

    #[test]
    fn test_filter_deserialize_defaults() {
        let filter: Filter = serde_json::from_str(r#"{"search":"milk","limit":10}"#).unwrap();
        assert_eq!(filter.search_term(), Some("milk"));
        assert_eq!(filter.effective_limit(), Some(10));
        assert_eq!(filter.id, None);
    }
}
