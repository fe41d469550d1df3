//! Freedesktop notification surface using notify-rust
//!
//! The panel slot maps onto a server-side notification, so a second `display`
//! replaces the bubble in place. One [`ActionListener`] thread per surface
//! follows the live notification id and wakes the relay on every activation
//! of its `add` action, for as long as the bubble stays up.

use notify_rust::{Hint, Notification, NotificationHandle, Timeout, Urgency};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::errors::{AppError, AppResult};
use crate::panel::{
    ChannelDescriptor, Importance, NotificationRequest, RenderSurface, SlotId, WakeSource,
};

/// What the notification server reported for one notification id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSignal {
    Invoked(String),
    Closed,
}

/// Blocking wait for the next signal about a server-side notification
pub trait ActionSource: Send + Sync + 'static {
    fn next_signal(&self, id: u32) -> ActionSignal;
}

/// D-Bus signals via notify-rust
struct NotifyRustActions;

impl ActionSource for NotifyRustActions {
    fn next_signal(&self, id: u32) -> ActionSignal {
        let mut signal = ActionSignal::Closed;
        notify_rust::handle_action(id, |action: &str| {
            if action != "__closed" {
                signal = ActionSignal::Invoked(action.to_string());
            }
        });
        signal
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveAction {
    id: u32,
    tag: String,
    generation: u64,
}

struct ListenerShared {
    live: Mutex<Option<LiveAction>>,
    armed_sender: flume::Sender<()>,
    armed_receiver: flume::Receiver<()>,
    stopped: AtomicBool,
}

impl ListenerShared {
    fn live(&self) -> MutexGuard<'_, Option<LiveAction>> {
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Single long-lived watcher for the action of the live notification
///
/// The thread starts on the first [`arm`](Self::arm) and survives replaces,
/// hides and repeated taps; only the surface going away stops it.
pub struct ActionListener {
    shared: Arc<ListenerShared>,
    source: Arc<dyn ActionSource>,
    wake: WakeSource,
    thread: OnceCell<()>,
    threads_spawned: AtomicUsize,
}

impl ActionListener {
    pub fn new(source: Arc<dyn ActionSource>, wake: WakeSource) -> Self {
        let (armed_sender, armed_receiver) = flume::unbounded();
        Self {
            shared: Arc::new(ListenerShared {
                live: Mutex::new(None),
                armed_sender,
                armed_receiver,
                stopped: AtomicBool::new(false),
            }),
            source,
            wake,
            thread: OnceCell::new(),
            threads_spawned: AtomicUsize::new(0),
        }
    }

    /// Watch notification `id` for `tag`, replacing whatever was watched
    pub fn arm(&self, id: u32, tag: impl Into<String>, generation: u64) -> AppResult<()> {
        *self.shared.live() = Some(LiveAction {
            id,
            tag: tag.into(),
            generation,
        });
        self.ensure_thread()?;
        let _ = self.shared.armed_sender.send(());
        Ok(())
    }

    /// Stop reacting to activations until the next `arm`
    pub fn disarm(&self) {
        self.shared.live().take();
    }

    pub fn is_armed(&self) -> bool {
        self.shared.live().is_some()
    }

    /// Listener threads started over this listener's lifetime
    pub fn threads_spawned(&self) -> usize {
        self.threads_spawned.load(Ordering::SeqCst)
    }

    fn ensure_thread(&self) -> AppResult<()> {
        self.thread
            .get_or_try_init(|| {
                let shared = self.shared.clone();
                let source = self.source.clone();
                let wake = self.wake.clone();
                std::thread::Builder::new()
                    .name("panel-actions".to_string())
                    .spawn(move || listen(shared, source, wake))
                    .map_err(|e| AppError::surface_with_source("spawn action listener", e))?;
                self.threads_spawned.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .map(|_| ())
    }
}

impl Drop for ActionListener {
    fn drop(&mut self) {
        self.shared.stopped.store(true, Ordering::SeqCst);
        let _ = self.shared.armed_sender.send(());
    }
}

fn listen(shared: Arc<ListenerShared>, source: Arc<dyn ActionSource>, wake: WakeSource) {
    debug!("Action listener started");

    while !shared.stopped.load(Ordering::SeqCst) {
        let watched = shared.live().clone();
        let Some(watched) = watched else {
            if shared.armed_receiver.recv().is_err() {
                break;
            }
            continue;
        };

        match source.next_signal(watched.id) {
            ActionSignal::Invoked(action) => {
                let current = shared.live().clone();
                match current {
                    Some(live) if live.id == watched.id && live.tag == action => {
                        debug!("Action '{}' on notification {} (generation {})", action, live.id, live.generation);
                        wake.wake();
                    }
                    _ => debug!("Ignoring action '{}' on stale notification {}", action, watched.id),
                }
            }
            ActionSignal::Closed => {
                let mut live = shared.live();
                if live.as_ref().map(|l| l.id) == Some(watched.id) {
                    info!("Desktop notification {} closed by the server", watched.id);
                    *live = None;
                }
            }
        }
    }

    debug!("Action listener stopped");
}

pub struct DesktopSurface {
    app_name: String,
    action_label: String,
    channel: Mutex<Option<ChannelDescriptor>>,
    shown: Mutex<HashMap<SlotId, NotificationHandle>>,
    actions: ActionListener,
}

impl DesktopSurface {
    pub fn new(
        app_name: impl Into<String>,
        action_label: impl Into<String>,
        wake: WakeSource,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            action_label: action_label.into(),
            channel: Mutex::new(None),
            shown: Mutex::new(HashMap::new()),
            actions: ActionListener::new(Arc::new(NotifyRustActions), wake),
        }
    }

    fn urgency(importance: Importance) -> Urgency {
        match importance {
            Importance::Low => Urgency::Low,
            Importance::Default => Urgency::Normal,
            Importance::High => Urgency::Critical,
        }
    }
}

impl RenderSurface for DesktopSurface {
    fn register_channel(&self, descriptor: &ChannelDescriptor) -> AppResult<()> {
        // Freedesktop servers have no channel concept; the descriptor only
        // shapes the hints of every notification posted afterwards.
        let mut channel = self
            .channel
            .lock()
            .map_err(|_| AppError::surface("register_channel", "channel lock poisoned"))?;
        *channel = Some(descriptor.clone());
        debug!("Desktop surface adopted channel '{}'", descriptor.id);
        Ok(())
    }

    fn display(&self, slot: SlotId, request: &NotificationRequest) -> AppResult<()> {
        let descriptor = self
            .channel
            .lock()
            .map_err(|_| AppError::surface("display", "channel lock poisoned"))?
            .clone()
            .ok_or_else(|| AppError::surface("display", "channel not registered"))?;

        let mut shown = self
            .shown
            .lock()
            .map_err(|_| AppError::surface("display", "slot table poisoned"))?;

        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&request.title)
            .action(&request.action.tag, &self.action_label)
            .hint(Hint::Resident(request.ongoing))
            .hint(Hint::Category(descriptor.id.clone()))
            .urgency(Self::urgency(descriptor.importance))
            .timeout(Timeout::Never);
        if descriptor.sound.is_none() {
            notification.hint(Hint::SuppressSound(true));
        }
        if let Some(existing) = shown.get(&slot) {
            notification.id(existing.id());
        }

        let handle = notification
            .show()
            .map_err(|e| AppError::surface("display", e.to_string()))?;
        let id = handle.id();
        shown.insert(slot, handle);

        self.actions.arm(id, request.action.tag.clone(), request.action.generation)?;
        info!("Desktop notification {} shown for {}", id, slot);
        Ok(())
    }

    fn clear(&self, slot: SlotId) -> AppResult<()> {
        let mut shown = self
            .shown
            .lock()
            .map_err(|_| AppError::surface("clear", "slot table poisoned"))?;
        self.actions.disarm();

        let Some(handle) = shown.remove(&slot) else {
            debug!("Nothing to clear in {}", slot);
            return Ok(());
        };

        let id = handle.id();
        handle.close();
        info!("Desktop notification {} closed for {}", id, slot);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "desktop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{BridgeEvent, ChannelSettings, EventSubscription, PanelContext};
    use crate::surfaces::LogSurface;
    use std::time::{Duration, Instant};

    /// Signals fed by the test; records which ids were waited on
    struct ScriptedActions {
        signals: flume::Receiver<ActionSignal>,
        waited: Mutex<Vec<u32>>,
    }

    impl ActionSource for ScriptedActions {
        fn next_signal(&self, id: u32) -> ActionSignal {
            self.waited.lock().unwrap().push(id);
            self.signals.recv().unwrap_or(ActionSignal::Closed)
        }
    }

    fn listener() -> (
        PanelContext,
        ActionListener,
        flume::Sender<ActionSignal>,
        Arc<ScriptedActions>,
    ) {
        let context = PanelContext::with_surface(ChannelSettings::default(), Arc::new(LogSurface::new()));
        let (sender, signals) = flume::unbounded();
        let source = Arc::new(ScriptedActions {
            signals,
            waited: Mutex::new(Vec::new()),
        });
        let listener = ActionListener::new(source.clone(), context.wake_source());
        (context, listener, sender, source)
    }

    fn wait_for_events(subscription: &EventSubscription, expected: usize) -> usize {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut received = 0;
        while received < expected && Instant::now() < deadline {
            match subscription.try_recv() {
                Some(BridgeEvent::Add) => received += 1,
                None => std::thread::sleep(Duration::from_millis(5)),
            }
        }
        received
    }

    fn wait_until(condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_urgency_follows_importance() {
        assert!(matches!(DesktopSurface::urgency(Importance::High), Urgency::Critical));
        assert!(matches!(DesktopSurface::urgency(Importance::Default), Urgency::Normal));
        assert!(matches!(DesktopSurface::urgency(Importance::Low), Urgency::Low));
    }

    #[test]
    fn test_every_tap_on_resident_notification_wakes() {
        let (context, listener, taps, _source) = listener();
        let subscription = context.subscribe();

        listener.arm(7, "add", 1).unwrap();
        for _ in 0..3 {
            taps.send(ActionSignal::Invoked("add".to_string())).unwrap();
        }

        assert_eq!(wait_for_events(&subscription, 3), 3);
        assert!(listener.is_armed());
    }

    #[test]
    fn test_repeated_displays_share_one_listener_thread() {
        let (_context, listener, _taps, _source) = listener();

        for generation in 1..=50 {
            listener.arm(7, "add", generation).unwrap();
        }
        listener.disarm();
        listener.arm(8, "add", 51).unwrap();

        assert_eq!(listener.threads_spawned(), 1);
    }

    #[test]
    fn test_other_actions_do_not_wake() {
        let (context, listener, taps, _source) = listener();
        let subscription = context.subscribe();

        listener.arm(7, "add", 1).unwrap();
        taps.send(ActionSignal::Invoked("default".to_string())).unwrap();
        taps.send(ActionSignal::Invoked("add".to_string())).unwrap();

        assert_eq!(wait_for_events(&subscription, 1), 1);
        assert_eq!(subscription.try_recv(), None);
    }

    #[test]
    fn test_server_close_disarms_until_next_display() {
        let (_context, listener, taps, source) = listener();

        listener.arm(7, "add", 1).unwrap();
        taps.send(ActionSignal::Closed).unwrap();
        assert!(wait_until(|| !listener.is_armed()));

        listener.arm(9, "add", 2).unwrap();
        assert!(wait_until(|| source.waited.lock().unwrap().last() == Some(&9)));
    }

    #[test]
    fn test_tap_after_disarm_is_ignored() {
        let (context, listener, taps, source) = listener();
        let subscription = context.subscribe();

        listener.arm(7, "add", 1).unwrap();
        assert!(wait_until(|| !source.waited.lock().unwrap().is_empty()));
        listener.disarm();
        taps.send(ActionSignal::Invoked("add".to_string())).unwrap();
        assert!(wait_until(|| taps.is_empty()));
        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(subscription.try_recv(), None);
        assert_eq!(context.status().unwrap().events_delivered, 0);
    }
}
