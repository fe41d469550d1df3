//! Ownership root for the panel components

use std::sync::Arc;
use tracing::info;

use super::adapter::{SlotSnapshot, SurfaceAdapter};
use super::bridge::{BridgeEndpoint, CommandBridge, EventSubscription};
use super::channel::{ChannelRegistry, ChannelSettings};
use super::relay::{InteractionRelay, WakeSource};
use super::surface::RenderSurface;
use crate::errors::AppResult;

/// Everything the panel needs, built once and shared by reference
///
/// Construction order matters: the relay exists before the surface, so a
/// surface can be handed the wake source it fires on user interaction. The
/// relay is bound to the command bridge once the bridge exists.
pub struct PanelContext {
    endpoint: Arc<BridgeEndpoint>,
    relay: Arc<InteractionRelay>,
    adapter: Arc<SurfaceAdapter>,
    bridge: Arc<CommandBridge>,
}

impl PanelContext {
    /// Build a context whose surface is created from the relay's wake source
    pub fn new<F>(channel: ChannelSettings, make_surface: F) -> AppResult<Self>
    where
        F: FnOnce(WakeSource) -> AppResult<Arc<dyn RenderSurface>>,
    {
        let relay = Arc::new(InteractionRelay::new());
        let surface = make_surface(WakeSource::new(relay.clone()))?;

        info!("Panel context using {} surface, channel '{}'", surface.name(), channel.id);

        Ok(Self::assemble(channel, surface, relay))
    }

    /// Build a context around an existing surface
    pub fn with_surface(channel: ChannelSettings, surface: Arc<dyn RenderSurface>) -> Self {
        Self::assemble(channel, surface, Arc::new(InteractionRelay::new()))
    }

    fn assemble(
        channel: ChannelSettings,
        surface: Arc<dyn RenderSurface>,
        relay: Arc<InteractionRelay>,
    ) -> Self {
        let endpoint = BridgeEndpoint::new();
        let adapter = Arc::new(SurfaceAdapter::new(ChannelRegistry::new(channel), surface));
        let bridge = Arc::new(CommandBridge::new(adapter.clone(), endpoint.clone()));
        relay.bind(&bridge);

        Self {
            endpoint,
            relay,
            adapter,
            bridge,
        }
    }

    pub fn bridge(&self) -> &CommandBridge {
        &self.bridge
    }

    pub fn wake_source(&self) -> WakeSource {
        WakeSource::new(self.relay.clone())
    }

    pub fn subscribe(&self) -> EventSubscription {
        self.bridge.register_listener()
    }

    pub fn status(&self) -> AppResult<PanelStatusSnapshot> {
        Ok(PanelStatusSnapshot {
            slot: self.adapter.snapshot()?,
            channel_registered: self.adapter.channel_registered(),
            listener_attached: self.endpoint.is_attached(),
            events_delivered: self.endpoint.events_delivered(),
            events_dropped: self.endpoint.events_dropped(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct PanelStatusSnapshot {
    pub slot: SlotSnapshot,
    pub channel_registered: bool,
    pub listener_attached: bool,
    pub events_delivered: u64,
    pub events_dropped: u64,
}
