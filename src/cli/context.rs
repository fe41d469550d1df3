//! CLI Context for dependency injection and shared state
//!
//! This module provides the CliContext abstraction that centralizes
//! configuration management and logging setup for CLI handlers.

use anyhow::{Context, Result};
use notification_panel::config::ConfigManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

/// CLI execution context containing shared dependencies and configuration
#[derive(Clone)]
pub struct CliContext {
    pub home: Option<PathBuf>,
    pub verbose: bool,
    /// Whether `config.toml` existed before this invocation created it
    pub config_existed: bool,
    pub config_manager: Arc<ConfigManager>,
}

impl CliContext {
    /// Create a new CLI context for the given base directory
    pub fn new(home: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let config_existed = ConfigManager::get_config_path(home.clone())
            .context("Failed to resolve configuration path")?
            .exists();
        let config_manager = Arc::new(
            ConfigManager::new(home.clone()).context("Failed to load configuration")?,
        );

        Ok(Self {
            home,
            verbose,
            config_existed,
            config_manager,
        })
    }

    pub fn socket_path(&self) -> PathBuf {
        self.config_manager.socket_path()
    }

    pub fn pid_path(&self) -> PathBuf {
        self.config_manager.pid_path()
    }

    /// Initialize logging based on verbosity and configuration
    ///
    /// Console output goes to stderr so command output on stdout stays
    /// clean. With `file_logging`, `daemon.log_path` adds a daily-rolling
    /// file; the returned guard must live as long as the process logs.
    pub fn init_logging(&self, file_logging: bool) -> Result<Option<WorkerGuard>> {
        let config = self.config_manager.config();
        let log_level = if self.verbose {
            "debug"
        } else {
            config.daemon.log_level.as_str()
        };

        let env_filter = tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(log_level.parse().unwrap_or_else(|_| tracing::Level::INFO.into()));

        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr);

        let (file_layer, guard) = match (&config.daemon.log_path, file_logging) {
            (Some(log_path), true) => {
                let log_path = PathBuf::from(log_path);
                let directory = log_path
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                std::fs::create_dir_all(&directory).context("Failed to create log directory")?;

                let file_name = log_path
                    .file_name()
                    .map(|name| name.to_os_string())
                    .unwrap_or_else(|| "daemon.log".into());
                let file_appender = tracing_appender::rolling::daily(directory, file_name);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            _ => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        if self.verbose {
            tracing::debug!("Verbose logging enabled");
            tracing::debug!("Config path: {}", self.config_manager.config_path().display());
        }

        Ok(guard)
    }
}
