use anyhow::{Context as _, Result};
use clap::Parser;
use database::PgTaskRepository;
use scheduler_cli::commands::{execute, exit_code, Command, EXIT_CONFIG, EXIT_STARTUP};
use scheduler_cli::config::Config;
use scheduler_cli::setup::create_repository;
use scheduler_cli::telemetry::{init_telemetry, log_startup_info};
use scheduler_core::{Context, TaskRepository};
use std::time::Duration;
use tracing::{error, info, warn};

/// Upper bound on the shutdown of the pool
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "scheduler")]
#[command(about = "Scheduler task store")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<String>,

    /// Database URL override
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level override
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Per-command timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(config_file) => Config::from_file(config_file)?,
        None => Config::from_env()?,
    };

    // Apply CLI overrides
    if let Some(ref database_url) = cli.database_url {
        config.database.url = Some(database_url.clone());
    }

    if let Some(ref log_level) = cli.log_level {
        config.logging.level = log_level.clone();
    }

    if let Some(timeout) = cli.timeout {
        config.database.operation_timeout = timeout;
    }

    Ok(config)
}

/// Cancel every in-flight operation on Ctrl-C
fn spawn_interrupt_handler(ctx: Context) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling in-flight operation");
            ctx.cancel();
        }
    });
}

async fn run_command(repo: &PgTaskRepository, ctx: &Context, command: &Command) -> Result<String> {
    match command {
        Command::Migrate => {
            ctx.run(repo.migrate()).await?;
            Ok("migrations applied".to_string())
        }
        Command::Task(command) => execute(repo, ctx, command).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(EXIT_CONFIG);
        }
    };

    init_telemetry(&config.logging).context("Failed to initialize telemetry")?;

    // Validate configuration (will exit if invalid)
    if let Err(e) = config.validate() {
        error!(error = %e, "Configuration validation failed");
        std::process::exit(EXIT_CONFIG);
    }

    log_startup_info(&config);

    let root = Context::background();
    spawn_interrupt_handler(root.clone());

    let timeout = config.database.operation_timeout();
    let repo = match create_repository(&root.with_timeout(timeout), &config).await {
        Ok(repo) => repo,
        Err(e) => {
            error!(error = %e, "Failed to open task repository");
            std::process::exit(EXIT_STARTUP);
        }
    };

    let outcome = run_command(&repo, &root.with_timeout(timeout), &cli.command).await;

    if let Err(e) = repo
        .close(&Context::background().with_timeout(CLOSE_TIMEOUT))
        .await
    {
        warn!(error = %e, "Failed to close connection pool cleanly");
    }

    match outcome {
        Ok(output) => {
            println!("{output}");
            info!("Command completed");
            Ok(())
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Command failed");
            std::process::exit(exit_code(&e));
        }
    }
}
