use std::str::FromStr;
use crate::common::{row_to_task, sqlx_error_to_task_error};
use crate::pool::{spawn_health_monitor, PoolSettings};
use crate::query::{compile_filter, DELETE_TASK, INSERT_TASK, PING, UPDATE_TASK};
use async_trait::async_trait;
use parking_lot::Mutex;
use scheduler_core::{
    context::Context,
    error::{Result, TaskError},
    models::{Filter, Task},
    repository::TaskRepository,
};
use sqlx::{postgres::PgConnectOptions, PgPool};
use tokio::task::JoinHandle;

/// PostgreSQL implementation of the TaskRepository trait
///
/// Owns the connection pool for the `scheduler` table. Each operation checks
/// a connection out for a single statement, so the repository can be shared
/// behind an `Arc` by any number of concurrent callers.
#[derive(Debug)]
pub struct PgTaskRepository {
    pool: PgPool,
    health_monitor: Mutex<Option<JoinHandle<()>>>,
}

impl PgTaskRepository {
    /// Connect with the default pool bounds
    ///
    /// # Returns
    /// * `Ok(PgTaskRepository)` - Pool is built and answered the liveness probe
    /// * `Err(TaskError::Configuration)` - If the connection string is malformed
    /// * `Err(TaskError::Connection)` - If the pool cannot be built or the probe fails
    ///
    /// # Examples
    /// ```rust,no_run
    /// use database::PgTaskRepository;
    /// use scheduler_core::Context;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let ctx = Context::background();
    /// let repo = PgTaskRepository::connect(&ctx, "postgres://localhost/scheduler").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(ctx: &Context, database_url: &str) -> Result<Self> {
        Self::connect_with(ctx, database_url, PoolSettings::default()).await
    }

    /// Connect with explicit pool bounds
    pub async fn connect_with(
        ctx: &Context,
        database_url: &str,
        settings: PoolSettings,
    ) -> Result<Self> {
        settings.validate().map_err(TaskError::Configuration)?;

        let connect_options = PgConnectOptions::from_str(database_url).map_err(|e| {
            TaskError::Configuration(format!("Unable to parse database URL: {e}"))
        })?;

        tracing::debug!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            health_check_period_secs = settings.health_check_period.as_secs(),
            "Creating connection pool"
        );

        let pool = ctx
            .run(async {
                settings
                    .pool_options()
                    .connect_with(connect_options)
                    .await
                    .map_err(|e| {
                        TaskError::Connection(format!("Unable to create connection pool: {e}"))
                    })
            })
            .await?;

        let probe = ctx
            .run(async {
                sqlx::query(PING).execute(&pool).await.map_err(|e| {
                    TaskError::Connection(format!("Unable to connect to database: {e}"))
                })
            })
            .await;
        if let Err(error) = probe {
            pool.close().await;
            return Err(error);
        }

        let monitor = spawn_health_monitor(pool.clone(), settings.health_check_period);
        tracing::info!("Connection pool ready");

        Ok(Self {
            pool,
            health_monitor: Mutex::new(Some(monitor)),
        })
    }

    /// Wrap an already built pool
    ///
    /// No liveness probe and no health monitor; the caller owns both concerns.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            health_monitor: Mutex::new(None),
        }
    }

    /// Run database migrations
    ///
    /// Creates the `scheduler` table and its date index when missing.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations/postgres")
            .run(&self.pool)
            .await
            .map_err(|e| TaskError::Database(format!("Migration failed: {e}")))?;

        tracing::info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get access to the underlying database pool for custom operations
    ///
    /// This method is primarily intended for testing scenarios where
    /// direct SQL execution is needed.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    fn stop_health_monitor(&self) {
        if let Some(handle) = self.health_monitor.lock().take() {
            handle.abort();
        }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_task(&self, ctx: &Context, filter: &Filter) -> Result<Vec<Task>> {
        let compiled = compile_filter(filter);

        tracing::debug!(
            sql = compiled.sql(),
            args = compiled.args().len(),
            "Executing task query"
        );

        let rows = ctx
            .run(async {
                compiled
                    .build()
                    .fetch_all(&self.pool)
                    .await
                    .map_err(sqlx_error_to_task_error)
            })
            .await?;

        let tasks = rows
            .iter()
            .map(row_to_task)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(sqlx_error_to_task_error)?;

        tracing::debug!(count = tasks.len(), "Task query returned");
        Ok(tasks)
    }

    async fn create_task(&self, ctx: &Context, task: &Task) -> Result<i64> {
        let id: i64 = ctx
            .run(async {
                sqlx::query_scalar::<_, i64>(INSERT_TASK)
                    .bind(&task.date)
                    .bind(&task.title)
                    .bind(&task.comment)
                    .bind(&task.repeat)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(sqlx_error_to_task_error)
            })
            .await?;

        tracing::debug!(id, date = %task.date, "Task created");
        Ok(id)
    }

    async fn update_task(&self, ctx: &Context, task: &Task) -> Result<()> {
        let result = ctx
            .run(async {
                sqlx::query(UPDATE_TASK)
                    .bind(&task.date)
                    .bind(&task.title)
                    .bind(&task.comment)
                    .bind(&task.repeat)
                    .bind(task.id)
                    .execute(&self.pool)
                    .await
                    .map_err(sqlx_error_to_task_error)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskError::not_found_id(task.id));
        }

        tracing::debug!(id = task.id, "Task updated");
        Ok(())
    }

    async fn delete_task(&self, ctx: &Context, id: i64) -> Result<()> {
        let result = ctx
            .run(async {
                sqlx::query(DELETE_TASK)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(sqlx_error_to_task_error)
            })
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskError::not_found_id(id));
        }

        tracing::debug!(id, "Task deleted");
        Ok(())
    }

    async fn close(&self, ctx: &Context) -> Result<()> {
        if self.pool.is_closed() {
            tracing::debug!("Connection pool already closed");
            return Ok(());
        }

        // The pool is marked closed before the drain future is first polled,
        // so an expired context only cuts the wait for checked-out connections.
        let drain = self.pool.close();
        self.stop_health_monitor();
        ctx.run(async {
            drain.await;
            Ok(())
        })
        .await?;

        tracing::info!("Connection pool closed");
        Ok(())
    }

    async fn health_check(&self, ctx: &Context) -> Result<()> {
        ctx.run(async {
            sqlx::query(PING)
                .execute(&self.pool)
                .await
                .map_err(sqlx_error_to_task_error)
        })
        .await?;
        Ok(())
    }
}

impl Drop for PgTaskRepository {
    fn drop(&mut self) {
        self.stop_health_monitor();
    }
}
