//! Subcommands driving a `TaskRepository`
//!
//! Everything here is generic over the repository so it runs against the
//! in-memory mock as well as PostgreSQL.

use anyhow::Result;
use clap::{Args, Subcommand};
use scheduler_core::{Context, Filter, TaskError, TaskInput, TaskRepository};
use tracing::info;

/// Process exit code for an invalid configuration
pub const EXIT_CONFIG: i32 = 1;
/// Process exit code when the repository cannot be opened
pub const EXIT_STARTUP: i32 = 2;
/// Process exit code for a failed command
pub const EXIT_COMMAND: i32 = 3;
/// Process exit code when the addressed task does not exist
pub const EXIT_NOT_FOUND: i32 = 4;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply pending schema migrations
    Migrate,
    #[command(flatten)]
    Task(TaskCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    /// Verify the database answers a ping
    Check,
    /// List tasks as a JSON array, ordered by date
    List(ListArgs),
    /// Create a task and print its id
    Add(AddArgs),
    /// Change fields of a stored task
    Update(UpdateArgs),
    /// Delete a task by id
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    #[arg(long)]
    pub id: Option<i64>,
    /// Case-insensitive substring of title or comment
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    /// Maximum rows; 0 means unlimited
    #[arg(long, default_value_t = 0)]
    pub limit: i64,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct AddArgs {
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub comment: String,
    #[arg(long, default_value = "")]
    pub repeat: String,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateArgs {
    #[arg(long)]
    pub id: i64,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub comment: Option<String>,
    #[arg(long)]
    pub repeat: Option<String>,
}

impl ListArgs {
    pub fn filter(&self) -> Filter {
        Filter {
            id: self.id,
            search_term: self.search.clone(),
            date: self.date.clone(),
            limit: self.limit,
        }
    }
}

impl AddArgs {
    pub fn input(&self) -> TaskInput {
        TaskInput {
            id: None,
            date: Some(self.date.clone()),
            title: Some(self.title.clone()),
            comment: Some(self.comment.clone()),
            repeat: Some(self.repeat.clone()),
        }
    }
}

impl UpdateArgs {
    pub fn patch(&self) -> TaskInput {
        TaskInput {
            id: None,
            date: self.date.clone(),
            title: self.title.clone(),
            comment: self.comment.clone(),
            repeat: self.repeat.clone(),
        }
    }
}

/// Run one command and return what it prints on stdout
pub async fn execute<R>(repo: &R, ctx: &Context, command: &TaskCommand) -> Result<String>
where
    R: TaskRepository + ?Sized,
{
    match command {
        TaskCommand::Check => {
            repo.health_check(ctx).await?;
            info!("Database is reachable");
            Ok("ok".to_string())
        }
        TaskCommand::List(args) => {
            let filter = args.filter();
            let tasks = repo.find_task(ctx, &filter).await?;
            info!(count = tasks.len(), "Listed tasks");
            Ok(serde_json::to_string_pretty(&tasks)?)
        }
        TaskCommand::Add(args) => {
            let task = args.input().into_task();
            if task.date.trim().is_empty() {
                return Err(TaskError::Validation("date must not be empty".to_string()).into());
            }
            if task.title.trim().is_empty() {
                return Err(TaskError::Validation("title must not be empty".to_string()).into());
            }
            let id = repo.create_task(ctx, &task).await?;
            info!(task_id = id, "Task created");
            Ok(id.to_string())
        }
        TaskCommand::Update(args) => {
            let patch = args.patch();
            if patch.is_empty() {
                return Err(TaskError::Validation(
                    "nothing to update: pass at least one of --date, --title, --comment, --repeat"
                        .to_string(),
                )
                .into());
            }
            let stored = repo
                .get_task(ctx, args.id)
                .await?
                .ok_or_else(|| TaskError::not_found_id(args.id))?;
            let updated = patch.apply(stored);
            repo.update_task(ctx, &updated).await?;
            info!(task_id = updated.id, "Task updated");
            Ok(serde_json::to_string_pretty(&updated)?)
        }
        TaskCommand::Delete { id } => {
            repo.delete_task(ctx, *id).await?;
            info!(task_id = id, "Task deleted");
            Ok(format!("deleted {id}"))
        }
    }
}

/// Map a command failure onto the process exit code
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<TaskError>() {
        Some(e) if e.is_not_found() => EXIT_NOT_FOUND,
        Some(e) if e.is_fatal_startup() => EXIT_STARTUP,
        _ => EXIT_COMMAND,
    }
}
