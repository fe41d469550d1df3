//! Channel registry
//!
//! Lazily builds the panel's notification category and registers it with the
//! surface exactly once for the lifetime of the owning context.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use super::surface::RenderSurface;
use crate::errors::{AppError, AppResult};

pub const DEFAULT_CHANNEL_ID: &str = "timing_persistent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Default,
    High,
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Importance::Low => "low",
            Importance::Default => "default",
            Importance::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for Importance {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Importance::Low),
            "default" => Ok(Importance::Default),
            "high" => Ok(Importance::High),
            _ => Err(AppError::InvalidConfigValue {
                key: "channel.importance".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Notification category the panel posts under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub id: String,
    pub display_name: String,
    pub importance: Importance,
    pub vibration: bool,
    pub sound: Option<String>,
}

/// Configurable part of the channel
///
/// Vibration and sound are not configurable: the panel is always silent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSettings {
    pub id: String,
    pub display_name: String,
    pub importance: Importance,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            id: DEFAULT_CHANNEL_ID.to_string(),
            display_name: DEFAULT_CHANNEL_ID.to_string(),
            importance: Importance::High,
        }
    }
}

impl ChannelSettings {
    pub fn descriptor(&self) -> ChannelDescriptor {
        ChannelDescriptor {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            importance: self.importance,
            vibration: false,
            sound: None,
        }
    }
}

/// Process-lifetime cache of the registered channel
pub struct ChannelRegistry {
    settings: ChannelSettings,
    registered: OnceCell<ChannelDescriptor>,
}

impl ChannelRegistry {
    pub fn new(settings: ChannelSettings) -> Self {
        Self {
            settings,
            registered: OnceCell::new(),
        }
    }

    /// Return the registered descriptor, registering it on first use.
    ///
    /// A failed registration leaves the registry empty, so the next call
    /// tries again.
    pub fn ensure_channel(&self, surface: &dyn RenderSurface) -> AppResult<ChannelDescriptor> {
        let descriptor = self.registered.get_or_try_init(|| {
            let descriptor = self.settings.descriptor();
            debug!("Registering channel '{}' with {} surface", descriptor.id, surface.name());
            surface.register_channel(&descriptor)?;
            info!(
                "Channel '{}' registered (importance: {})",
                descriptor.id, descriptor.importance
            );
            Ok::<_, AppError>(descriptor)
        })?;

        Ok(descriptor.clone())
    }

    pub fn is_registered(&self) -> bool {
        self.registered.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::surface::{NotificationRequest, SlotId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSurface {
        registrations: AtomicUsize,
        fail: bool,
    }

    impl RenderSurface for CountingSurface {
        fn register_channel(&self, _descriptor: &ChannelDescriptor) -> AppResult<()> {
            self.registrations.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::surface("register_channel", "rejected"));
            }
            Ok(())
        }

        fn display(&self, _slot: SlotId, _request: &NotificationRequest) -> AppResult<()> {
            Ok(())
        }

        fn clear(&self, _slot: SlotId) -> AppResult<()> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_default_descriptor_is_silent_and_high() {
        let descriptor = ChannelSettings::default().descriptor();
        assert_eq!(descriptor.id, "timing_persistent");
        assert_eq!(descriptor.importance, Importance::High);
        assert!(!descriptor.vibration);
        assert!(descriptor.sound.is_none());
    }

    #[test]
    fn test_ensure_channel_registers_once() {
        let surface = CountingSurface::default();
        let registry = ChannelRegistry::new(ChannelSettings::default());

        assert!(!registry.is_registered());
        let first = registry.ensure_channel(&surface).unwrap();
        let second = registry.ensure_channel(&surface).unwrap();

        assert_eq!(first, second);
        assert!(registry.is_registered());
        assert_eq!(surface.registrations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_registration_is_not_cached() {
        let surface = CountingSurface { fail: true, ..Default::default() };
        let registry = ChannelRegistry::new(ChannelSettings::default());

        assert!(registry.ensure_channel(&surface).is_err());
        assert!(registry.ensure_channel(&surface).is_err());
        assert!(!registry.is_registered());
        assert_eq!(surface.registrations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_importance_parsing() {
        assert_eq!("HIGH".parse::<Importance>().unwrap(), Importance::High);
        assert_eq!("low".parse::<Importance>().unwrap(), Importance::Low);
        assert!("urgent".parse::<Importance>().is_err());
    }
}
