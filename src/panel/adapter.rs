//! Render surface adapter
//!
//! The only component that changes what is visible. Every `show` composes a
//! fresh request with a fresh action handle and puts it in [`DISPLAY_SLOT`];
//! every `hide` clears that slot.

use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use super::channel::ChannelRegistry;
use super::surface::{ActionRef, NotificationRequest, RenderSurface, DISPLAY_SLOT};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
struct Occupant {
    title: String,
    action: ActionRef,
    shown_at: DateTime<Local>,
}

#[derive(Debug, Default)]
struct SlotState {
    occupant: Option<Occupant>,
    generation: u64,
}

/// Point-in-time view of the display slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub title: Option<String>,
    pub action: Option<ActionRef>,
    pub shown_at: Option<DateTime<Local>>,
}

impl SlotSnapshot {
    pub fn is_visible(&self) -> bool {
        self.title.is_some()
    }
}

pub struct SurfaceAdapter {
    registry: ChannelRegistry,
    surface: Arc<dyn RenderSurface>,
    slot: Mutex<SlotState>,
}

impl SurfaceAdapter {
    pub fn new(registry: ChannelRegistry, surface: Arc<dyn RenderSurface>) -> Self {
        Self {
            registry,
            surface,
            slot: Mutex::new(SlotState::default()),
        }
    }

    /// Create or replace the panel notification with `content` as its title.
    ///
    /// The slot lock is held across the platform call so concurrent commands
    /// never observe a half-replaced notification. Local state only changes
    /// once the surface accepted the request.
    pub fn show(&self, content: &str) -> AppResult<()> {
        let mut slot = self.lock_slot()?;

        let channel = self.registry.ensure_channel(self.surface.as_ref())?;
        let generation = slot.generation + 1;
        let action = ActionRef::new(generation);
        let request = NotificationRequest::new(&channel, content, action.clone());

        debug!(
            "Displaying '{}' in {} on {} surface (action generation {})",
            content, DISPLAY_SLOT, self.surface.name(), generation
        );
        self.surface.display(DISPLAY_SLOT, &request)?;

        let replaced = slot.occupant.replace(Occupant {
            title: content.to_string(),
            action,
            shown_at: Local::now(),
        });
        slot.generation = generation;

        match replaced {
            Some(previous) => info!("Panel updated: '{}' -> '{}'", previous.title, content),
            None => info!("Panel shown: '{}'", content),
        }
        Ok(())
    }

    /// Clear the panel slot. Safe to call when nothing is displayed.
    pub fn hide(&self) -> AppResult<()> {
        let mut slot = self.lock_slot()?;

        self.surface.clear(DISPLAY_SLOT)?;

        match slot.occupant.take() {
            Some(previous) => info!("Panel hidden (was '{}')", previous.title),
            None => debug!("Hide requested with empty {}", DISPLAY_SLOT),
        }
        Ok(())
    }

    pub fn snapshot(&self) -> AppResult<SlotSnapshot> {
        let slot = self.lock_slot()?;
        Ok(SlotSnapshot {
            title: slot.occupant.as_ref().map(|o| o.title.clone()),
            action: slot.occupant.as_ref().map(|o| o.action.clone()),
            shown_at: slot.occupant.as_ref().map(|o| o.shown_at),
        })
    }

    pub fn channel_registered(&self) -> bool {
        self.registry.is_registered()
    }

    fn lock_slot(&self) -> AppResult<MutexGuard<'_, SlotState>> {
        self.slot
            .lock()
            .map_err(|_| AppError::internal("display slot lock poisoned"))
    }
}
