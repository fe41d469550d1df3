//! Command handlers for all CLI operations
//!
//! This module routes parsed commands to the handler owning each concern,
//! keeping CLI parsing separate from panel and daemon logic.

pub mod config;
pub mod daemon;
pub mod panel;
pub mod traits;

use super::{CliContext, Commands};
use anyhow::Result;
use config::ConfigHandler;
use daemon::DaemonHandler;
use panel::PanelHandler;
use traits::HandlerBuilder;

/// Coordinates all command handling operations with dependency injection via CliContext
pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Route commands to their appropriate handlers
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        let builder = HandlerBuilder::new(&self.context);

        match command {
            Commands::Show { content } => {
                builder.create_with_context::<PanelHandler>().handle_show(&content).await
            }
            Commands::Hide => builder.create_with_context::<PanelHandler>().handle_hide().await,
            Commands::Listen { count } => {
                builder.create_with_context::<PanelHandler>().handle_listen(count).await
            }
            Commands::Tap => builder.create_with_context::<PanelHandler>().handle_tap().await,
            Commands::Invoke { method, arguments } => {
                builder
                    .create_with_context::<PanelHandler>()
                    .handle_invoke(method, arguments)
                    .await
            }
            Commands::Init { force } => builder.create_with_context::<ConfigHandler>().handle_init(force),
            Commands::Config { action } => {
                builder.create_with_context::<ConfigHandler>().handle_config(action)
            }
            Commands::Daemon { action } => {
                builder.create_with_context::<DaemonHandler>().handle_daemon(action).await
            }
        }
    }
}
