//! Render surface collaborator interface
//!
//! The platform side of the panel. A surface registers the channel descriptor,
//! displays a composed request in a slot and clears that slot again. Concrete
//! surfaces live in [`crate::surfaces`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::channel::ChannelDescriptor;
use crate::errors::AppResult;

/// Action tag bound to the panel's single control
pub const ACTION_TAG: &str = "add";

/// Correlation id the wake source is configured with
pub const ACTION_CORRELATION_ID: u32 = 0;

/// Fixed identity of a notification on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u32);

/// The one slot the panel ever occupies
pub const DISPLAY_SLOT: SlotId = SlotId(1);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Handle correlating the notification's control to a wake-up
///
/// A new `ActionRef` is minted on every `show`; the generation tells a live
/// handle apart from a superseded one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRef {
    pub tag: String,
    pub correlation_id: u32,
    pub generation: u64,
}

impl ActionRef {
    pub fn new(generation: u64) -> Self {
        Self {
            tag: ACTION_TAG.to_string(),
            correlation_id: ACTION_CORRELATION_ID,
            generation,
        }
    }
}

/// Notification composed for a single `show` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub channel_id: String,
    pub title: String,
    pub ongoing: bool,
    pub alert_once: bool,
    pub action: ActionRef,
}

impl NotificationRequest {
    /// Build a persistent, alert-once request bound to `channel`
    pub fn new(channel: &ChannelDescriptor, title: impl Into<String>, action: ActionRef) -> Self {
        Self {
            channel_id: channel.id.clone(),
            title: title.into(),
            ongoing: true,
            alert_once: true,
            action,
        }
    }
}

/// Platform notification surface
///
/// Calls are synchronous and expected to return quickly. Implementations
/// report failures as [`crate::errors::AppError::Surface`]; the panel never
/// retries them.
pub trait RenderSurface: Send + Sync {
    /// Register the notification category with the platform
    fn register_channel(&self, descriptor: &ChannelDescriptor) -> AppResult<()>;

    /// Show `request` in `slot`, replacing whatever occupies it
    fn display(&self, slot: SlotId, request: &NotificationRequest) -> AppResult<()>;

    /// Remove whatever occupies `slot`; succeeds when the slot is empty
    fn clear(&self, slot: SlotId) -> AppResult<()>;

    /// Short backend name used in logs
    fn name(&self) -> &'static str;
}
