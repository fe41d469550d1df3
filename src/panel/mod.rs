//! Panel core
//!
//! This module provides:
//! - Channel registration, done once per context
//! - The render surface adapter owning the single display slot
//! - The interaction relay that turns user taps into `add` events
//! - The command bridge the application talks to

pub mod adapter;
pub mod bridge;
pub mod channel;
pub mod context;
pub mod relay;
pub mod surface;

// Re-export commonly used types
pub use adapter::{SlotSnapshot, SurfaceAdapter};
pub use bridge::{
    BridgeEndpoint, BridgeEvent, CommandBridge, Delivery, EventSubscription, MethodCall,
    CHANNEL_NAME, METHOD_HIDE, METHOD_SHOW,
};
pub use channel::{ChannelDescriptor, ChannelRegistry, ChannelSettings, Importance};
pub use context::{PanelContext, PanelStatusSnapshot};
pub use relay::{InteractionRelay, RelayState, WakeSource};
pub use surface::{
    ActionRef, NotificationRequest, RenderSurface, SlotId, ACTION_CORRELATION_ID, ACTION_TAG,
    DISPLAY_SLOT,
};
