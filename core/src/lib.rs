//! Scheduler Core Library
//!
//! This crate provides the domain model, error taxonomy, cancellation context
//! and repository contract for the scheduler task store. The storage engine
//! (`database`) and the test doubles (`mocks`) depend on the types and
//! interfaces defined here.
//!
//! # Architecture
//!
//! - [`models`] - Task, TaskInput patch and Filter
//! - [`error`] - Error types and result handling
//! - [`context`] - Cancellation and deadline propagation
//! - [`repository`] - Repository trait for data persistence
//!
//! # Example
//!
//! ```rust
//! use scheduler_core::{Filter, Task, TaskInput};
//!
//! let stored = Task::default().with_id(1).with_date("2024-01-01").with_title("Buy milk");
//! let patch = TaskInput { title: Some("Buy oat milk".to_string()), ..Default::default() };
//! let updated = patch.apply(stored);
//! assert_eq!(updated.date, "2024-01-01");
//!
//! let filter = Filter::new().with_search("milk").with_limit(2);
//! assert_eq!(filter.effective_limit(), Some(2));
//! ```

pub mod context;
pub mod error;
pub mod models;
pub mod repository;

// Re-export commonly used types at the crate root for convenience
pub use context::Context;
pub use error::{Result, TaskError};
pub use models::{parse_task_id, Filter, Task, TaskInput, TaskOverride};
pub use repository::TaskRepository;

/// Current version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
