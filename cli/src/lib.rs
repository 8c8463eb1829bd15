//! Scheduler command-line library
//!
//! Configuration loading, logging setup, repository construction and the
//! subcommands of the `scheduler` binary.

pub mod commands;
pub mod config;
pub mod setup;
pub mod telemetry;

pub use commands::{execute, exit_code, Command, TaskCommand};
pub use config::Config;
pub use setup::create_repository;
pub use telemetry::init_telemetry;
