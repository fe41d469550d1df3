//! Command definitions and structures for the CLI
//!
//! This module contains all the clap-based command line argument definitions,
//! including the main CLI structure and all subcommands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "notification-panel")]
#[command(about = "Persistent notification panel with show/hide commands and tap events")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base directory for configuration, socket and PID files
    #[arg(long, global = true, env = "NOTIFICATION_PANEL_HOME")]
    pub home: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the panel notification, replacing the current one
    Show {
        /// Text displayed as the notification title
        content: String,
    },

    /// Hide the panel notification
    Hide,

    /// Attach as the event listener and print each `add` event
    Listen {
        /// Exit after this many events
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Simulate the user tapping the panel's control
    Tap,

    /// Send a raw method call to the command bridge
    Invoke {
        /// Method name
        method: String,

        /// JSON-encoded arguments
        #[arg(short, long)]
        arguments: Option<String>,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Daemon management
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
}

/// Configuration management actions
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key (e.g., surface.backend)
        key: String,
        /// Value to set
        value: String,
    },

    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },
}

/// Daemon management actions
#[derive(Subcommand)]
pub enum DaemonAction {
    /// Start the daemon
    Start {
        /// Run in detached mode (background)
        #[arg(short = 'd', long)]
        detach: bool,
    },

    /// Stop the daemon
    Stop,

    /// Check daemon status
    Status,
}

impl Commands {
    /// Whether this command runs the daemon in the current process
    pub fn runs_daemon(&self) -> bool {
        matches!(
            self,
            Commands::Daemon {
                action: DaemonAction::Start { detach: false }
            }
        )
    }
}
