use crate::errors::{AppError, AppResult};
use directories::BaseDirs;
use std::fs;
use std::path::{Path, PathBuf};

// Re-export shared types for convenience
pub use crate::shared::config::{Config, DaemonConfig, SurfaceConfig};

const BASE_DIR_NAME: &str = ".notification-panel";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration manager for the notification panel
///
/// Loads `config.toml` from the panel's base directory, writing a default
/// file on first use. The base directory is `~/.notification-panel` unless an
/// explicit home is given.
///
/// # Example
///
/// ```rust,no_run
/// use notification_panel::config::ConfigManager;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config_manager = ConfigManager::new(None)?;
///     println!("Backend: {}", config_manager.config().surface.backend);
///     Ok(())
/// }
/// ```
pub struct ConfigManager {
    base_dir: PathBuf,
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Creates a new ConfigManager instance
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The base directory cannot be determined or created
    /// - The configuration file cannot be read or parsed
    /// - Default configuration cannot be serialized and written
    pub fn new(home: Option<PathBuf>) -> AppResult<Self> {
        let base_dir = Self::resolve_base_dir(home)?;
        let config_path = base_dir.join(CONFIG_FILE_NAME);
        let config = Self::load_or_create(&config_path)?;

        Ok(ConfigManager {
            base_dir,
            config_path,
            config,
        })
    }

    /// Resolve and create the directory holding config, socket and PID files
    pub fn resolve_base_dir(home: Option<PathBuf>) -> AppResult<PathBuf> {
        let base_path = match home {
            Some(path) => path,
            None => {
                let base_dirs = BaseDirs::new()
                    .ok_or_else(|| AppError::config("Failed to get base directories"))?;
                base_dirs.home_dir().join(BASE_DIR_NAME)
            }
        };

        fs::create_dir_all(&base_path)
            .map_err(|e| AppError::io_with_source(&base_path, "create base directory", e))?;

        Ok(base_path)
    }

    pub fn get_config_path(home: Option<PathBuf>) -> AppResult<PathBuf> {
        Ok(Self::resolve_base_dir(home)?.join(CONFIG_FILE_NAME))
    }

    fn load_or_create(path: &Path) -> AppResult<Config> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| AppError::io_with_source(path, "read config file", e))?;
            toml::from_str(&content)
                .map_err(|e| AppError::config_with_source("Failed to parse config file", e))
        } else {
            let config = Config::default();
            let content = toml::to_string_pretty(&config)
                .map_err(|e| AppError::config_with_source("Failed to serialize default config", e))?;
            fs::write(path, content)
                .map_err(|e| AppError::io_with_source(path, "write default config", e))?;
            Ok(config)
        }
    }

    /// Saves the current configuration to the file it was loaded from
    pub fn save(&self) -> AppResult<()> {
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| AppError::config_with_source("Failed to serialize config", e))?;
        fs::write(&self.config_path, content)
            .map_err(|e| AppError::io_with_source(&self.config_path, "write config file", e))?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access; call [`save()`](Self::save) to persist changes.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Daemon socket location, honouring `daemon.socket_path`
    pub fn socket_path(&self) -> PathBuf {
        self.config
            .daemon
            .socket_path
            .clone()
            .unwrap_or_else(|| self.base_dir.join("daemon.sock"))
    }

    pub fn pid_path(&self) -> PathBuf {
        self.socket_path().with_extension("pid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_default_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::new(Some(temp_dir.path().to_path_buf())).unwrap();

        assert!(temp_dir.path().join("config.toml").exists());
        assert_eq!(manager.config().channel.id, "timing_persistent");
        assert_eq!(manager.socket_path(), temp_dir.path().join("daemon.sock"));
        assert_eq!(manager.pid_path(), temp_dir.path().join("daemon.pid"));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let home = Some(temp_dir.path().to_path_buf());

        let mut manager = ConfigManager::new(home.clone()).unwrap();
        manager.config_mut().surface.action_label = "Log entry".to_string();
        manager.save().unwrap();

        let reloaded = ConfigManager::new(home).unwrap();
        assert_eq!(reloaded.config().surface.action_label, "Log entry");
    }

    #[test]
    fn test_rejects_broken_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.toml"), "channel = [").unwrap();

        let result = ConfigManager::new(Some(temp_dir.path().to_path_buf()));
        assert!(matches!(result, Err(AppError::Config { .. })));
    }
}
