//! Command bridge and shared bridge endpoint
//!
//! The application talks to the panel through [`CommandBridge`]: named method
//! calls flow in, `add` events flow out. The outbound side is a
//! [`BridgeEndpoint`] shared with the interaction relay; it holds at most one
//! listener registration at a time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, warn};

use super::adapter::SurfaceAdapter;
use crate::errors::{AppError, AppResult};

/// Name of the command channel
pub const CHANNEL_NAME: &str = "notification_panel";

pub const METHOD_SHOW: &str = "show";
pub const METHOD_HIDE: &str = "hide";

/// A named command from the application layer
///
/// Arguments travel as JSON text so the call stays self-describing across
/// the bincode framing used by the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Option<String>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: None,
        }
    }

    pub fn with_arguments(mut self, arguments: serde_json::Value) -> Self {
        self.arguments = Some(arguments.to_string());
        self
    }

    pub fn show(content: impl Into<String>) -> Self {
        Self::new(METHOD_SHOW).with_arguments(serde_json::Value::String(content.into()))
    }

    pub fn hide() -> Self {
        Self::new(METHOD_HIDE)
    }

    /// Decode the arguments as a single string.
    pub fn string_argument(&self, name: &str) -> AppResult<String> {
        let raw = self
            .arguments
            .as_deref()
            .ok_or_else(|| AppError::invalid_argument(name, "missing payload"))?;

        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| AppError::invalid_argument(name, format!("malformed payload: {e}")))?;

        match value {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Null => Err(AppError::invalid_argument(name, "missing payload")),
            other => Err(AppError::invalid_argument(
                name,
                format!("expected a string, got {}", json_kind(&other)),
            )),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Events flowing from the panel to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeEvent {
    /// The user activated the panel's control
    Add,
}

impl BridgeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::Add => "add",
        }
    }
}

impl fmt::Display for BridgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of publishing an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Dropped,
}

struct Listener {
    id: u64,
    sender: flume::Sender<BridgeEvent>,
}

enum ListenerSlot {
    Detached,
    Attached(Listener),
}

/// Shared handle for the outbound direction
pub struct BridgeEndpoint {
    listener: Mutex<ListenerSlot>,
    next_listener_id: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl BridgeEndpoint {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            listener: Mutex::new(ListenerSlot::Detached),
            next_listener_id: AtomicU64::new(1),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        })
    }

    /// Attach a new listener, replacing any existing one.
    ///
    /// The returned subscription detaches itself when dropped, unless a newer
    /// listener has taken its place by then.
    pub fn attach(self: &Arc<Self>) -> EventSubscription {
        let (sender, receiver) = flume::unbounded();
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);

        let mut slot = self.lock_listener();
        if let ListenerSlot::Attached(previous) = &*slot {
            info!("Listener {} replaced by listener {}", previous.id, id);
        } else {
            info!("Listener {} attached", id);
        }
        *slot = ListenerSlot::Attached(Listener { id, sender });

        EventSubscription {
            id,
            receiver,
            endpoint: Arc::downgrade(self),
        }
    }

    /// Detach listener `id` if it is still the attached one
    pub fn detach(&self, id: u64) {
        let mut slot = self.lock_listener();
        if matches!(&*slot, ListenerSlot::Attached(listener) if listener.id == id) {
            *slot = ListenerSlot::Detached;
            info!("Listener {} detached", id);
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(&*self.lock_listener(), ListenerSlot::Attached(_))
    }

    /// Hand `event` to the attached listener, or drop it.
    pub fn publish(&self, event: BridgeEvent) -> Delivery {
        let mut slot = self.lock_listener();

        let sent = match &*slot {
            ListenerSlot::Detached => None,
            ListenerSlot::Attached(listener) => {
                Some((listener.id, listener.sender.send(event).is_ok()))
            }
        };

        let delivery = match sent {
            None => {
                debug!("No listener attached, dropping '{}' event", event);
                Delivery::Dropped
            }
            Some((id, true)) => {
                debug!("Delivered '{}' event to listener {}", event, id);
                Delivery::Delivered
            }
            Some((id, false)) => {
                warn!("Listener {} went away, dropping '{}' event", id, event);
                *slot = ListenerSlot::Detached;
                Delivery::Dropped
            }
        };

        match delivery {
            Delivery::Delivered => self.delivered.fetch_add(1, Ordering::Relaxed),
            Delivery::Dropped => self.dropped.fetch_add(1, Ordering::Relaxed),
        };
        delivery
    }

    pub fn events_delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn events_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    // A panic while holding the slot cannot leave it half-written, so a
    // poisoned lock is still usable.
    fn lock_listener(&self) -> std::sync::MutexGuard<'_, ListenerSlot> {
        self.listener.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// An application-side listener registration
pub struct EventSubscription {
    id: u64,
    receiver: flume::Receiver<BridgeEvent>,
    endpoint: Weak<BridgeEndpoint>,
}

impl EventSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn try_recv(&self) -> Option<BridgeEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn recv(&self) -> Option<BridgeEvent> {
        self.receiver.recv().ok()
    }

    /// Wait for the next event; `None` once the subscription was replaced
    /// and its channel closed.
    pub async fn recv_async(&self) -> Option<BridgeEvent> {
        self.receiver.recv_async().await.ok()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(endpoint) = self.endpoint.upgrade() {
            endpoint.detach(self.id);
        }
    }
}

/// Application-facing command handler
pub struct CommandBridge {
    adapter: Arc<SurfaceAdapter>,
    endpoint: Arc<BridgeEndpoint>,
}

impl CommandBridge {
    pub fn new(adapter: Arc<SurfaceAdapter>, endpoint: Arc<BridgeEndpoint>) -> Self {
        Self { adapter, endpoint }
    }

    /// Dispatch a method call.
    ///
    /// Returns `None` for method names this bridge does not know; such calls
    /// get no completion at all.
    pub fn handle(&self, call: &MethodCall) -> Option<AppResult<()>> {
        match call.method.as_str() {
            METHOD_SHOW => Some(
                call.string_argument("content")
                    .and_then(|content| self.adapter.show(&content)),
            ),
            METHOD_HIDE => Some(self.adapter.hide()),
            other => {
                debug!("Ignoring unrecognized method '{}'", other);
                None
            }
        }
    }

    /// Register the application listener for outbound events
    pub fn register_listener(&self) -> EventSubscription {
        self.endpoint.attach()
    }

    /// Send `event` to the registered listener; the interaction relay
    /// forwards every wake-up through here.
    pub fn notify(&self, event: BridgeEvent) -> Delivery {
        self.endpoint.publish(event)
    }
}
