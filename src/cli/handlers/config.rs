//! Configuration management handler
//!
//! This module handles configuration initialization and key-based
//! reads and writes of `config.toml`.

use super::super::{CliContext, ConfigAction};
use anyhow::{Context, Result};
use notification_panel::config::{Config, ConfigManager};
use notification_panel::panel::Importance;
use notification_panel::surfaces::supported_backends;

/// Keys accepted by `config get` and `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "channel.id",
    "channel.display_name",
    "channel.importance",
    "surface.backend",
    "surface.app_name",
    "surface.action_label",
    "daemon.log_level",
    "daemon.log_path",
];

/// Handler for configuration operations
pub struct ConfigHandler<'a> {
    context: &'a CliContext,
}

impl<'a> ConfigHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    /// Handle configuration initialization
    pub fn handle_init(&self, force: bool) -> Result<()> {
        let config_path = self.context.config_manager.config_path();

        if self.context.config_existed && !force {
            println!("Configuration already initialized at: {}", config_path.display());
            println!("Use --force to overwrite");
            return Ok(());
        }

        let mut config_manager = ConfigManager::new(self.context.home.clone())?;
        *config_manager.config_mut() = Config::default();
        config_manager.save()?;
        println!("Configuration initialized successfully at: {}", config_path.display());
        Ok(())
    }

    /// Handle configuration management
    pub fn handle_config(&self, action: ConfigAction) -> Result<()> {
        let mut config_manager = ConfigManager::new(self.context.home.clone())?;

        match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(config_manager.config())?);
            }
            ConfigAction::Set { key, value } => {
                set_value(config_manager.config_mut(), &key, &value)?;
                config_manager.save()?;
                println!("Configuration updated: {key} = {value}");
            }
            ConfigAction::Get { key } => {
                println!("{}", get_value(config_manager.config(), &key)?);
            }
        }

        Ok(())
    }
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown configuration key: {} (valid keys: {})",
        key,
        CONFIG_KEYS.join(", ")
    )
}

fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "channel.id" => {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("Channel id must not be empty"));
            }
            config.channel.id = value.to_string();
        }
        "channel.display_name" => config.channel.display_name = value.to_string(),
        "channel.importance" => config.channel.importance = value.parse::<Importance>()?,
        "surface.backend" => {
            if !supported_backends().iter().any(|backend| *backend == value) {
                return Err(anyhow::anyhow!(
                    "Unsupported surface backend: {} (supported: {})",
                    value,
                    supported_backends().join(", ")
                ));
            }
            config.surface.backend = value.to_string();
        }
        "surface.app_name" => config.surface.app_name = value.to_string(),
        "surface.action_label" => config.surface.action_label = value.to_string(),
        "daemon.log_level" => {
            value
                .parse::<tracing::Level>()
                .with_context(|| format!("Invalid log level: {value}"))?;
            config.daemon.log_level = value.to_string();
        }
        "daemon.log_path" => {
            config.daemon.log_path = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

fn get_value(config: &Config, key: &str) -> Result<String> {
    let value = match key {
        "channel.id" => config.channel.id.clone(),
        "channel.display_name" => config.channel.display_name.clone(),
        "channel.importance" => config.channel.importance.to_string(),
        "surface.backend" => config.surface.backend.clone(),
        "surface.app_name" => config.surface.app_name.clone(),
        "surface.action_label" => config.surface.action_label.clone(),
        "daemon.log_level" => config.daemon.log_level.clone(),
        "daemon.log_path" => config
            .daemon
            .log_path
            .clone()
            .unwrap_or_else(|| "None".to_string()),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}

super::traits::impl_context_handler!(ConfigHandler<'a>);
