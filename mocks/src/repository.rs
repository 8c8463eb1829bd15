//! Mock implementation of TaskRepository trait
//!
//! Provides a thread-safe in-memory repository with:
//! - The same filter semantics as the PostgreSQL engine
//! - Error injection capabilities
//! - Call tracking for verification
//! - Artificial latency for cancellation testing

use async_trait::async_trait;
use parking_lot::Mutex;
use scheduler_core::{Context, Filter, Result, Task, TaskError, TaskRepository};
use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicBool, AtomicI64, Ordering},
    Arc,
};
use std::time::Duration;

/// Whether `task` satisfies every present predicate of `filter`.
///
/// Search is a case-insensitive substring match against title or comment.
pub fn matches_filter(filter: &Filter, task: &Task) -> bool {
    if let Some(id) = filter.id {
        if task.id != id {
            return false;
        }
    }
    if let Some(term) = filter.search_term() {
        let needle = term.to_lowercase();
        if !task.title.to_lowercase().contains(&needle)
            && !task.comment.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    if let Some(date) = filter.date() {
        if task.date != date {
            return false;
        }
    }
    true
}

/// Apply `filter` to `tasks`: matching rows ordered by date then id, limited
pub fn apply_filter<'a, I>(filter: &Filter, tasks: I) -> Vec<Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut selected: Vec<Task> = tasks
        .into_iter()
        .filter(|task| matches_filter(filter, task))
        .cloned()
        .collect();
    selected.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    if let Some(limit) = filter.effective_limit() {
        selected.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    selected
}

/// Mock implementation of TaskRepository for testing
///
/// Clones share the same underlying store.
#[derive(Clone)]
pub struct MockTaskRepository {
    tasks: Arc<Mutex<BTreeMap<i64, Task>>>,
    next_id: Arc<AtomicI64>,
    error_injection: Arc<Mutex<Option<TaskError>>>,
    call_history: Arc<Mutex<Vec<String>>>,
    latency: Arc<Mutex<Option<Duration>>>,
    closed: Arc<AtomicBool>,
}

impl Default for MockTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTaskRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::with_next_id(1)
    }

    /// Create mock repository with pre-populated tasks
    ///
    /// Tasks keep their ids; new ids continue after the largest one.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let max_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        let repo = Self::with_next_id(max_id + 1);
        {
            let mut store = repo.tasks.lock();
            for task in tasks {
                store.insert(task.id, task);
            }
        }
        repo
    }

    /// Create mock repository with specific starting ID
    pub fn with_next_id(next_id: i64) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(next_id)),
            error_injection: Arc::new(Mutex::new(None)),
            call_history: Arc::new(Mutex::new(Vec::new())),
            latency: Arc::new(Mutex::new(None)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Inject error for next operation
    pub fn inject_error(&self, error: TaskError) {
        *self.error_injection.lock() = Some(error);
    }

    /// Clear error injection
    pub fn clear_error(&self) {
        *self.error_injection.lock() = None;
    }

    /// Delay every following operation by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Get history of called methods
    pub fn call_history(&self) -> Vec<String> {
        self.call_history.lock().clone()
    }

    /// Clear call history
    pub fn clear_history(&self) {
        self.call_history.lock().clear();
    }

    /// Assert method was called
    pub fn assert_called(&self, method: &str) {
        let history = self.call_history.lock();
        assert!(
            history.iter().any(|call| call.contains(method)),
            "Method '{}' was not called. Call history: {:?}",
            method,
            *history
        );
    }

    /// Snapshot of every stored task, ordered by id
    pub fn stored_tasks(&self) -> Vec<Task> {
        self.tasks.lock().values().cloned().collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Check if an error should be injected, consuming it if so
    fn check_error_injection(&self) -> Result<()> {
        let mut error_opt = self.error_injection.lock();
        if let Some(error) = error_opt.take() {
            return Err(error);
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(TaskError::Database("Connection pool is closed".to_string()));
        }
        Ok(())
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Record method call with parameters in history
    fn record_call_with_params(&self, method: &str, params: &str) {
        self.call_history.lock().push(format!("{method}({params})"));
    }

    /// Record method call in history
    fn record_call(&self, method: &str) {
        self.call_history.lock().push(format!("{method}()"));
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn find_task(&self, ctx: &Context, filter: &Filter) -> Result<Vec<Task>> {
        self.record_call_with_params("find_task", &format!("{filter:?}"));

        ctx.run(async {
            self.simulate_latency().await;
            self.check_error_injection()?;
            self.ensure_open()?;

            let tasks = self.tasks.lock();
            Ok(apply_filter(filter, tasks.values()))
        })
        .await
    }

    async fn create_task(&self, ctx: &Context, task: &Task) -> Result<i64> {
        self.record_call_with_params("create_task", &format!("title={}", task.title));

        ctx.run(async {
            self.simulate_latency().await;
            self.check_error_injection()?;
            self.ensure_open()?;

            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let stored = task.clone().with_id(id);
            self.tasks.lock().insert(id, stored);
            Ok(id)
        })
        .await
    }

    async fn update_task(&self, ctx: &Context, task: &Task) -> Result<()> {
        self.record_call_with_params("update_task", &format!("id={}", task.id));

        ctx.run(async {
            self.simulate_latency().await;
            self.check_error_injection()?;
            self.ensure_open()?;

            let mut tasks = self.tasks.lock();
            let stored = tasks
                .get_mut(&task.id)
                .ok_or_else(|| TaskError::not_found_id(task.id))?;
            *stored = task.clone();
            Ok(())
        })
        .await
    }

    async fn delete_task(&self, ctx: &Context, id: i64) -> Result<()> {
        self.record_call_with_params("delete_task", &format!("id={id}"));

        ctx.run(async {
            self.simulate_latency().await;
            self.check_error_injection()?;
            self.ensure_open()?;

            self.tasks
                .lock()
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| TaskError::not_found_id(id))
        })
        .await
    }

    async fn close(&self, ctx: &Context) -> Result<()> {
        self.record_call("close");
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        // Closed from here on; the context only bounds the simulated drain
        ctx.run(async {
            self.simulate_latency().await;
            Ok(())
        })
        .await
    }

    async fn health_check(&self, ctx: &Context) -> Result<()> {
        self.record_call("health_check");

        ctx.run(async {
            self.check_error_injection()?;
            self.ensure_open()
        })
        .await
    }
}
