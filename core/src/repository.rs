use async_trait::async_trait;
use crate::{
    context::Context,
    error::Result,
    models::{Filter, Task},
};

/// Repository trait for scheduler task persistence
///
/// This trait decouples callers from the storage engine. Implementations
/// must be thread-safe and support concurrent access without external
/// locking. Every operation takes the caller's [`Context`] first and returns
/// `TaskError::Cancelled` / `TaskError::DeadlineExceeded` when it fires.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Find tasks matching the filter, ordered by date ascending
    ///
    /// # Returns
    /// * `Ok(Vec<Task>)` - The matching tasks (empty when nothing matches)
    /// * `Err(TaskError::Database)` - If execution or row mapping fails
    async fn find_task(&self, ctx: &Context, filter: &Filter) -> Result<Vec<Task>>;

    /// Insert a task and return the id assigned by the database
    ///
    /// The task's own `id` is ignored.
    ///
    /// # Returns
    /// * `Ok(i64)` - The generated id
    /// * `Err(TaskError::Database)` - If the insert fails (e.g. constraint violation)
    async fn create_task(&self, ctx: &Context, task: &Task) -> Result<i64>;

    /// Overwrite date, title, comment and repeat of the task with `task.id`
    ///
    /// # Returns
    /// * `Ok(())` - The row was updated
    /// * `Err(TaskError::NotFound)` - If no row has that id
    /// * `Err(TaskError::Database)` - If the update fails
    async fn update_task(&self, ctx: &Context, task: &Task) -> Result<()>;

    /// Delete the task with the given id
    ///
    /// # Returns
    /// * `Ok(())` - The row was deleted
    /// * `Err(TaskError::NotFound)` - If no row has that id
    /// * `Err(TaskError::Database)` - If the delete fails
    async fn delete_task(&self, ctx: &Context, id: i64) -> Result<()>;

    /// Release the underlying connections
    ///
    /// Closing an already closed repository is a no-op.
    async fn close(&self, ctx: &Context) -> Result<()>;

    /// Verify the storage engine is reachable
    ///
    /// # Returns
    /// * `Ok(())` - Repository is healthy and connected
    /// * `Err(TaskError::Database)` - Repository is unhealthy
    async fn health_check(&self, ctx: &Context) -> Result<()>;

    /// Get a single task by id
    ///
    /// # Returns
    /// * `Ok(Some(Task))` - The task if found
    /// * `Ok(None)` - If no task exists with that id
    async fn get_task(&self, ctx: &Context, id: i64) -> Result<Option<Task>> {
        let mut tasks = self.find_task(ctx, &Filter::by_id(id)).await?;
        Ok(tasks.pop())
    }
}
