//! Headless surface that only records the slot and logs
//!
//! Useful on machines without a notification server; taps are simulated with
//! `notification-panel tap`.

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::panel::{ChannelDescriptor, NotificationRequest, RenderSurface, SlotId};

#[derive(Default)]
pub struct LogSurface {
    slots: Mutex<HashMap<SlotId, String>>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title currently shown in `slot`
    pub fn title(&self, slot: SlotId) -> Option<String> {
        self.slots.lock().ok().and_then(|slots| slots.get(&slot).cloned())
    }
}

impl RenderSurface for LogSurface {
    fn register_channel(&self, descriptor: &ChannelDescriptor) -> AppResult<()> {
        info!(
            channel = %descriptor.id,
            importance = %descriptor.importance,
            "Channel registered"
        );
        Ok(())
    }

    fn display(&self, slot: SlotId, request: &NotificationRequest) -> AppResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AppError::surface("display", "slot table poisoned"))?;
        let replaced = slots.insert(slot, request.title.clone()).is_some();
        info!(
            %slot,
            title = %request.title,
            action = %request.action.tag,
            replaced,
            "Notification displayed"
        );
        Ok(())
    }

    fn clear(&self, slot: SlotId) -> AppResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| AppError::surface("clear", "slot table poisoned"))?;
        let removed = slots.remove(&slot).is_some();
        info!(%slot, removed, "Notification cleared");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
