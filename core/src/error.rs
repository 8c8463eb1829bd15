use thiserror::Error;

/// Result type alias for task operations
pub type Result<T> = std::result::Result<T, TaskError>;

/// Error taxonomy for the scheduler task store.
///
/// Startup failures (`Configuration`, `Connection`) mean the store never
/// reached a serving state. `NotFound` is kept apart from `Database` so callers
/// can answer "does not exist" instead of a generic failure, and the two
/// cancellation kinds are kept apart from both.
///
/// # Examples
///
/// ```rust
/// use scheduler_core::error::TaskError;
///
/// let not_found = TaskError::not_found_id(42);
/// assert!(not_found.is_not_found());
/// assert_eq!(not_found.status_code(), 404);
///
/// assert!(TaskError::DeadlineExceeded.is_cancellation());
/// assert!(!TaskError::Database("boom".into()).is_cancellation());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Update or delete targeted an id that matched no row
    #[error("Task not found: {0}")]
    NotFound(String),

    /// Input rejected before reaching the database
    #[error("Validation error: {0}")]
    Validation(String),

    /// Statement failed inside the database engine
    #[error("Database error: {0}")]
    Database(String),

    /// Connection string or pool settings are malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pool could not be built or the liveness probe failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Caller's deadline elapsed before the operation finished
    #[error("Operation deadline exceeded")]
    DeadlineExceeded,
}

impl TaskError {
    /// Create a not found error for a task ID
    pub fn not_found_id(id: i64) -> Self {
        Self::NotFound(format!("Task with ID {id} not found"))
    }

    /// Check if this error indicates a not found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, TaskError::NotFound(_))
    }

    /// Check if this error indicates a validation problem
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }

    /// Check if this error indicates a database problem
    pub fn is_database(&self) -> bool {
        matches!(self, TaskError::Database(_))
    }

    /// Check if the caller cancelled the operation or its deadline elapsed
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Cancelled | TaskError::DeadlineExceeded)
    }

    /// Check if this error must stop the process from serving requests
    pub fn is_fatal_startup(&self) -> bool {
        matches!(self, TaskError::Configuration(_) | TaskError::Connection(_))
    }

    /// Convert to appropriate HTTP status code equivalent
    pub fn status_code(&self) -> u16 {
        match self {
            TaskError::NotFound(_) => 404,
            TaskError::Validation(_) => 400,
            TaskError::Database(_) => 500,
            TaskError::Configuration(_) => 500,
            TaskError::Connection(_) => 503,
            TaskError::Cancelled => 499, // Client Closed Request
            TaskError::DeadlineExceeded => 504,
        }
    }
}
