//! Render surface backends
//!
//! - **LogSurface**: headless backend that records the slot and logs
//! - **DesktopSurface**: freedesktop notifications via notify-rust (Linux/BSD)
//!
//! [`create_surface`] picks one from `surface.backend` in the configuration.

pub mod log;

#[cfg(all(unix, not(target_os = "macos")))]
pub mod desktop;

use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::panel::{RenderSurface, WakeSource};
use crate::shared::config::{SurfaceConfig, BACKEND_DESKTOP, BACKEND_LOG};

pub use self::log::LogSurface;

#[cfg(all(unix, not(target_os = "macos")))]
pub use desktop::DesktopSurface;

/// Backends this build can create
pub fn supported_backends() -> Vec<&'static str> {
    if cfg!(all(unix, not(target_os = "macos"))) {
        vec![BACKEND_DESKTOP, BACKEND_LOG]
    } else {
        vec![BACKEND_LOG]
    }
}

/// Create the configured render surface, wiring taps to `wake`
#[cfg_attr(not(all(unix, not(target_os = "macos"))), allow(unused_variables))]
pub fn create_surface(config: &SurfaceConfig, wake: WakeSource) -> AppResult<Arc<dyn RenderSurface>> {
    match config.backend.as_str() {
        BACKEND_LOG => Ok(Arc::new(LogSurface::new())),
        #[cfg(all(unix, not(target_os = "macos")))]
        BACKEND_DESKTOP => Ok(Arc::new(DesktopSurface::new(
            config.app_name.clone(),
            config.action_label.clone(),
            wake,
        ))),
        other => Err(AppError::InvalidConfigValue {
            key: "surface.backend".to_string(),
            value: format!("{other} (supported: {})", supported_backends().join(", ")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{ChannelSettings, PanelContext};

    fn config(backend: &str) -> SurfaceConfig {
        SurfaceConfig {
            backend: backend.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_log_surface() {
        let context = PanelContext::new(ChannelSettings::default(), |wake| {
            create_surface(&config("log"), wake)
        });
        assert!(context.is_ok());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = PanelContext::new(ChannelSettings::default(), |wake| {
            create_surface(&config("carrier-pigeon"), wake)
        });
        match result {
            Err(AppError::InvalidConfigValue { key, .. }) => assert_eq!(key, "surface.backend"),
            Err(other) => panic!("Unexpected error: {other}"),
            Ok(_) => panic!("Expected unknown backend to fail"),
        }
    }

    #[test]
    fn test_log_backend_always_supported() {
        assert!(supported_backends().contains(&"log"));
    }
}
