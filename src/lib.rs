//! Notification Panel Library
//!
//! A bridge between an application and a single persistent, interactive
//! notification: `show`/`hide` commands flow in, `add` events flow out when
//! the user taps the notification's control.

pub mod config;
pub mod daemon;
pub mod errors;
pub mod panel;
pub mod shared;
pub mod surfaces;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigManager};
pub use errors::{AppError, AppResult};
pub use panel::{BridgeEvent, CommandBridge, MethodCall, PanelContext, RenderSurface};
