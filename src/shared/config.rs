use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::panel::ChannelSettings;

/// Main configuration structure for the notification panel
///
/// Contains the channel the panel posts under, the render surface backend
/// and daemon options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub channel: ChannelSettings,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Render surface selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub backend: String, // "desktop" or "log"
    pub app_name: String,
    pub action_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub socket_path: Option<PathBuf>,
    pub log_level: String,
    pub log_path: Option<String>,
}

pub const BACKEND_DESKTOP: &str = "desktop";
pub const BACKEND_LOG: &str = "log";

fn default_backend() -> &'static str {
    if cfg!(all(unix, not(target_os = "macos"))) {
        BACKEND_DESKTOP
    } else {
        BACKEND_LOG
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        SurfaceConfig {
            backend: default_backend().to_string(),
            app_name: "Notification Panel".to_string(),
            action_label: "Add".to_string(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            socket_path: None,
            log_level: "info".to_string(),
            log_path: None,
        }
    }
}
