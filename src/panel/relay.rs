//! Interaction relay
//!
//! Receives wake-ups from the platform when the user activates the panel's
//! control and forwards a payload-free `add` event through the command
//! bridge's `notify`. With nothing attached the event is dropped on the floor.

use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, warn};

use super::bridge::{BridgeEvent, CommandBridge, Delivery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Dispatching,
}

const IDLE: u8 = 0;
const DISPATCHING: u8 = 1;

pub struct InteractionRelay {
    // Weak: the bridge owns the surface, which may hold this relay's wake source.
    bridge: OnceCell<Weak<CommandBridge>>,
    state: AtomicU8,
    // Wake-ups from different threads are handled one at a time.
    dispatch: Mutex<()>,
}

impl InteractionRelay {
    /// Create an unbound relay; wake-ups are dropped until [`bind`](Self::bind)
    pub fn new() -> Self {
        Self {
            bridge: OnceCell::new(),
            state: AtomicU8::new(IDLE),
            dispatch: Mutex::new(()),
        }
    }

    /// Route wake-ups through `bridge`. Only the first binding takes effect.
    pub fn bind(&self, bridge: &Arc<CommandBridge>) {
        if self.bridge.set(Arc::downgrade(bridge)).is_err() {
            warn!("Interaction relay is already bound to a command bridge");
        }
    }

    /// Handle one wake-up from the platform
    pub fn on_wake(&self) -> Delivery {
        let _dispatching = self.dispatch.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        self.state.store(DISPATCHING, Ordering::SeqCst);
        let delivery = match self.bridge.get().and_then(Weak::upgrade) {
            Some(bridge) => bridge.notify(BridgeEvent::Add),
            None => {
                debug!("No command bridge bound, dropping wake-up");
                Delivery::Dropped
            }
        };
        self.state.store(IDLE, Ordering::SeqCst);

        debug!("Wake-up handled: {:?}", delivery);
        delivery
    }

    pub fn state(&self) -> RelayState {
        match self.state.load(Ordering::SeqCst) {
            DISPATCHING => RelayState::Dispatching,
            _ => RelayState::Idle,
        }
    }
}

impl Default for InteractionRelay {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle a surface uses to wake the relay
///
/// Cheap to clone and safe to fire from any thread, including threads owned
/// by the platform notification library.
#[derive(Clone)]
pub struct WakeSource {
    relay: Arc<InteractionRelay>,
}

impl WakeSource {
    pub fn new(relay: Arc<InteractionRelay>) -> Self {
        Self { relay }
    }

    pub fn wake(&self) -> Delivery {
        self.relay.on_wake()
    }
}
