//! Behavioural properties of the panel bridge, exercised end to end
//! through `PanelContext` with a recording surface.

mod common;

use common::RecordingSurface;
use notification_panel::panel::{
    BridgeEvent, ChannelSettings, Delivery, Importance, MethodCall, PanelContext, ACTION_CORRELATION_ID,
    ACTION_TAG, DISPLAY_SLOT,
};
use notification_panel::AppError;
use serde_json::json;
use std::sync::Arc;

fn panel() -> (PanelContext, Arc<RecordingSurface>) {
    let surface = Arc::new(RecordingSurface::new());
    let context = PanelContext::with_surface(ChannelSettings::default(), surface.clone());
    (context, surface)
}

#[test]
fn test_show_occupies_slot_with_add_action() {
    let (context, surface) = panel();

    let result = context.bridge().handle(&MethodCall::show("Focus: 25 min"));
    assert!(matches!(result, Some(Ok(()))));

    let request = surface.shown(DISPLAY_SLOT).expect("slot should be occupied");
    assert_eq!(request.title, "Focus: 25 min");
    assert_eq!(request.channel_id, "timing_persistent");
    assert!(request.ongoing);
    assert!(request.alert_once);
    assert_eq!(request.action.tag, ACTION_TAG);
    assert_eq!(request.action.correlation_id, ACTION_CORRELATION_ID);
}

#[test]
fn test_show_replaces_instead_of_stacking() {
    let (context, surface) = panel();

    context.bridge().handle(&MethodCall::show("first")).unwrap().unwrap();
    context.bridge().handle(&MethodCall::show("second")).unwrap().unwrap();

    assert_eq!(surface.occupied_slots(), 1);
    assert_eq!(surface.shown(DISPLAY_SLOT).unwrap().title, "second");

    let status = context.status().unwrap();
    assert_eq!(status.slot.title.as_deref(), Some("second"));
}

#[test]
fn test_each_show_gets_fresh_action_ref() {
    let (context, surface) = panel();

    context.bridge().handle(&MethodCall::show("one")).unwrap().unwrap();
    let first = surface.shown(DISPLAY_SLOT).unwrap().action;
    context.bridge().handle(&MethodCall::show("two")).unwrap().unwrap();
    let second = surface.shown(DISPLAY_SLOT).unwrap().action;

    assert_eq!(first.tag, second.tag);
    assert_ne!(first.generation, second.generation);
}

#[test]
fn test_hide_is_idempotent() {
    let (context, surface) = panel();

    context.bridge().handle(&MethodCall::show("visible")).unwrap().unwrap();
    assert!(matches!(context.bridge().handle(&MethodCall::hide()), Some(Ok(()))));
    assert!(matches!(context.bridge().handle(&MethodCall::hide()), Some(Ok(()))));

    assert_eq!(surface.occupied_slots(), 0);
    assert!(!context.status().unwrap().slot.is_visible());
}

#[test]
fn test_hide_with_nothing_shown_completes() {
    let (context, _surface) = panel();
    assert!(matches!(context.bridge().handle(&MethodCall::hide()), Some(Ok(()))));
}

#[test]
fn test_show_without_string_payload_is_invalid_argument() {
    let (context, surface) = panel();
    context.bridge().handle(&MethodCall::show("kept")).unwrap().unwrap();

    let bad_calls = [
        MethodCall::new("show"),
        MethodCall::new("show").with_arguments(json!(null)),
        MethodCall::new("show").with_arguments(json!(42)),
        MethodCall::new("show").with_arguments(json!({"content": "nested"})),
    ];

    for call in &bad_calls {
        match context.bridge().handle(call) {
            Some(Err(AppError::InvalidArgument { .. })) => {}
            other => panic!("expected InvalidArgument for {:?}, got {:?}", call, other),
        }
    }

    assert_eq!(surface.shown(DISPLAY_SLOT).unwrap().title, "kept");
    assert_eq!(surface.display_count(), 1);
}

#[test]
fn test_unknown_method_gets_no_completion() {
    let (context, surface) = panel();

    assert!(context.bridge().handle(&MethodCall::new("toggle")).is_none());
    assert_eq!(surface.display_count(), 0);
    assert_eq!(surface.clear_count(), 0);
}

#[test]
fn test_wake_delivers_exactly_one_add() {
    let (context, _surface) = panel();
    let subscription = context.subscribe();

    assert_eq!(context.wake_source().wake(), Delivery::Delivered);

    assert_eq!(subscription.try_recv(), Some(BridgeEvent::Add));
    assert_eq!(subscription.try_recv(), None);
}

#[test]
fn test_wake_after_show_and_hide_delivers_one_add() {
    let (context, _surface) = panel();
    let subscription = context.subscribe();

    context.bridge().handle(&MethodCall::show("a")).unwrap().unwrap();
    context.bridge().handle(&MethodCall::show("b")).unwrap().unwrap();
    context.bridge().handle(&MethodCall::hide()).unwrap().unwrap();
    assert_eq!(subscription.try_recv(), None);

    assert_eq!(context.wake_source().wake(), Delivery::Delivered);

    assert_eq!(subscription.try_recv(), Some(BridgeEvent::Add));
    assert_eq!(subscription.try_recv(), None);
}

#[test]
fn test_wake_and_notify_reach_the_same_listener() {
    let (context, _surface) = panel();
    let subscription = context.subscribe();

    assert_eq!(context.bridge().notify(BridgeEvent::Add), Delivery::Delivered);
    assert_eq!(context.wake_source().wake(), Delivery::Delivered);

    assert_eq!(subscription.try_recv(), Some(BridgeEvent::Add));
    assert_eq!(subscription.try_recv(), Some(BridgeEvent::Add));
    assert_eq!(subscription.try_recv(), None);
    assert_eq!(context.status().unwrap().events_delivered, 2);
}

#[test]
fn test_wake_without_listener_is_dropped_silently() {
    let (context, _surface) = panel();

    assert_eq!(context.wake_source().wake(), Delivery::Dropped);

    let status = context.status().unwrap();
    assert_eq!(status.events_dropped, 1);
    assert_eq!(status.events_delivered, 0);
}

#[test]
fn test_dropped_subscription_detaches_listener() {
    let (context, _surface) = panel();
    {
        let _subscription = context.subscribe();
        assert!(context.status().unwrap().listener_attached);
    }
    assert!(!context.status().unwrap().listener_attached);
    assert_eq!(context.wake_source().wake(), Delivery::Dropped);
}

#[test]
fn test_newer_listener_replaces_older() {
    let (context, _surface) = panel();
    let older = context.subscribe();
    let newer = context.subscribe();

    context.wake_source().wake();

    assert_eq!(newer.try_recv(), Some(BridgeEvent::Add));
    assert_eq!(older.try_recv(), None);
}

#[test]
fn test_channel_registered_at_most_once() {
    let (context, surface) = panel();

    for title in ["a", "b", "c"] {
        context.bridge().handle(&MethodCall::show(title)).unwrap().unwrap();
    }
    context.bridge().handle(&MethodCall::hide()).unwrap().unwrap();
    context.bridge().handle(&MethodCall::show("d")).unwrap().unwrap();

    let registrations = surface.registrations();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0].id, "timing_persistent");
    assert_eq!(registrations[0].importance, Importance::High);
    assert!(!registrations[0].vibration);
    assert_eq!(registrations[0].sound, None);
}

#[test]
fn test_failed_display_reports_surface_error() {
    let (context, surface) = panel();
    context.bridge().handle(&MethodCall::show("before")).unwrap().unwrap();

    surface.fail_displays(true);
    let result = context.bridge().handle(&MethodCall::show("after"));
    assert!(matches!(result, Some(Err(AppError::Surface { .. }))));

    let status = context.status().unwrap();
    assert_eq!(status.slot.title.as_deref(), Some("before"));
}
