//! Tests for the event bus and its disposer-based subscriptions.

use std::sync::{Arc, Mutex};

use nido_core::api::{EventBus, EventKind, NidoEvent};

fn collector() -> (Arc<Mutex<Vec<NidoEvent>>>, impl Fn(&NidoEvent) + Send + Sync) {
    let seen: Arc<Mutex<Vec<NidoEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |event: &NidoEvent| {
        sink.lock().unwrap().push(event.clone())
    })
}

#[test]
fn test_subscribe_and_emit() {
    let bus = EventBus::new();
    let (seen, sink) = collector();
    let _sub = bus.on(EventKind::UnreadCount, sink);

    bus.emit(&NidoEvent::UnreadCountChanged { count: 4 });

    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[NidoEvent::UnreadCountChanged { count: 4 }]
    );
}

#[test]
fn test_filter_only_delivers_matching_kind() {
    let bus = EventBus::new();
    let (seen, sink) = collector();
    let _sub = bus.on(EventKind::Presence, sink);

    bus.emit(&NidoEvent::UnreadCountChanged { count: 1 });
    bus.emit(&NidoEvent::PresenceChanged {
        user_id: 3,
        online: true,
    });
    bus.emit(&NidoEvent::LoggedOut);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(matches!(seen[0], NidoEvent::PresenceChanged { .. }));
}

#[test]
fn test_dropping_subscription_unregisters() {
    let bus = EventBus::new();
    let (seen, sink) = collector();

    let sub = bus.on(EventKind::UnreadCount, sink);
    bus.emit(&NidoEvent::UnreadCountChanged { count: 1 });
    assert_eq!(bus.handler_count(), 1);

    drop(sub);
    assert_eq!(bus.handler_count(), 0);

    bus.emit(&NidoEvent::UnreadCountChanged { count: 2 });
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_remount_does_not_duplicate_deliveries() {
    // The defect class this design exists to prevent: a view that
    // unmounts and remounts must not end up subscribed twice.
    let bus = EventBus::new();
    let (seen, sink) = collector();

    // Mount
    let sub = bus.on(EventKind::UnreadCount, sink);
    bus.emit(&NidoEvent::UnreadCountChanged { count: 1 });

    // Unmount: the disposer drops with the scope, unconditionally.
    drop(sub);

    // Remount
    let (seen_again, sink_again) = collector();
    let _sub = bus.on(EventKind::UnreadCount, sink_again);
    bus.emit(&NidoEvent::UnreadCountChanged { count: 2 });

    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(seen_again.lock().unwrap().len(), 1);
    assert_eq!(bus.handler_count(), 1);
}

#[test]
fn test_unfiltered_subscription_sees_everything() {
    let bus = EventBus::new();
    let (seen, sink) = collector();
    let _sub = bus.subscribe(Arc::new(nido_core::api::CallbackHandler::new(sink)));

    bus.emit(&NidoEvent::LoggedOut);
    bus.emit(&NidoEvent::UnreadCountChanged { count: 9 });

    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_explicit_unsubscribe() {
    let bus = EventBus::new();
    let (seen, sink) = collector();

    let sub = bus.on(EventKind::Session, sink);
    sub.unsubscribe();

    bus.emit(&NidoEvent::LoggedOut);
    assert!(seen.lock().unwrap().is_empty());
}
