//! CLI module providing command-line interface functionality
//!
//! This module handles argument parsing, command validation, and routing
//! to appropriate handlers while maintaining separation of concerns.

pub mod commands;
pub mod context;
pub mod handlers;

use anyhow::Result;
use clap::Parser;

pub use commands::{Cli, Commands, ConfigAction, DaemonAction};
pub use context::CliContext;
pub use handlers::CommandHandler;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Parse command line arguments and execute the requested command
    pub async fn run() -> Result<()> {
        let cli = Cli::parse();

        let context = CliContext::new(cli.home.clone(), cli.verbose)?;

        // Only a process hosting the daemon writes the log file.
        let _log_guard = context.init_logging(cli.command.runs_daemon())?;

        let handler = CommandHandler::new(context);
        handler.handle_command(cli.command).await
    }
}
