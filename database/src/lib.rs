//! Database crate for the scheduler task store
//!
//! This crate provides the PostgreSQL implementation of the TaskRepository
//! trait: a filter-to-query compiler producing positional-parameter SQL, CRUD
//! over the `scheduler` table, and the connection pool lifecycle (bounded
//! pool, startup liveness probe, periodic health checks, idempotent close).
//!
//! # Usage
//!
//! ```rust,no_run
//! use database::{Context, Filter, PgTaskRepository, TaskRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ctx = Context::background();
//!     let repo = PgTaskRepository::connect(&ctx, "postgres://localhost/scheduler").await?;
//!
//!     // Run migrations
//!     repo.migrate().await?;
//!
//!     let upcoming = repo.find_task(&ctx, &Filter::new().with_limit(50)).await?;
//!     println!("{} tasks", upcoming.len());
//!
//!     repo.close(&ctx).await?;
//!     Ok(())
//! }
//! ```

mod common;
pub mod pool;
mod postgres;
pub mod query;

pub use pool::PoolSettings;
pub use postgres::PgTaskRepository;
pub use query::{compile_filter, FilterQuery, QueryArg};

// Re-export commonly used types from scheduler-core for convenience
pub use scheduler_core::{
    context::Context,
    error::{Result, TaskError},
    models::{Filter, Task, TaskInput},
    repository::TaskRepository,
};
