//! Event System
//!
//! Typed subscription surface for everything the core observes: session
//! lifecycle, navigation requests, realtime status, messages, unread
//! count and presence.
//!
//! Subscribing returns a [`Subscription`] disposer; dropping it removes
//! the handler. Teardown therefore cannot be skipped on any code path
//! that drops its scope, and a remounted view never receives duplicate
//! deliveries from a leaked predecessor.

use std::sync::{Arc, Mutex, Weak};

use crate::network::{ChatMessage, RealtimeStatus};
use crate::session::{Destination, UserId};

/// Events emitted by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum NidoEvent {
    /// A session became active (fresh login or restore).
    LoggedIn { user_id: UserId },

    /// The session ended by explicit logout.
    LoggedOut,

    /// The server rejected the session's token.
    SessionExpired,

    /// The hosting shell should navigate somewhere.
    Navigate { destination: Destination },

    /// Realtime connection status changed.
    RealtimeStatusChanged { status: RealtimeStatus },

    /// A chat message for the current user arrived.
    MessageReceived { message: ChatMessage },

    /// The reconciled unread count changed.
    UnreadCountChanged { count: u32 },

    /// A counterparty's online flag flipped.
    PresenceChanged { user_id: UserId, online: bool },
}

/// Event categories, for filtered subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Session,
    Navigation,
    RealtimeStatus,
    Message,
    UnreadCount,
    Presence,
}

impl NidoEvent {
    /// The category this event belongs to.
    pub const fn kind(&self) -> EventKind {
        match self {
            NidoEvent::LoggedIn { .. } | NidoEvent::LoggedOut | NidoEvent::SessionExpired => {
                EventKind::Session
            }
            NidoEvent::Navigate { .. } => EventKind::Navigation,
            NidoEvent::RealtimeStatusChanged { .. } => EventKind::RealtimeStatus,
            NidoEvent::MessageReceived { .. } => EventKind::Message,
            NidoEvent::UnreadCountChanged { .. } => EventKind::UnreadCount,
            NidoEvent::PresenceChanged { .. } => EventKind::Presence,
        }
    }
}

/// Event handler trait.
pub trait EventHandler: Send + Sync {
    /// Called for each event delivered to this handler.
    fn on_event(&self, event: &NidoEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(&NidoEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(&NidoEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(&NidoEvent) + Send + Sync,
{
    fn on_event(&self, event: &NidoEvent) {
        (self.callback)(event);
    }
}

struct HandlerEntry {
    id: u64,
    filter: Option<EventKind>,
    handler: Arc<dyn EventHandler>,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    handlers: Vec<HandlerEntry>,
}

/// Event bus with filtered subscriptions and disposer-based removal.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        EventBus::default()
    }

    /// Subscribes a handler to every event.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) -> Subscription {
        self.register(None, handler)
    }

    /// Subscribes a handler to one event category.
    pub fn subscribe_filtered(
        &self,
        kind: EventKind,
        handler: Arc<dyn EventHandler>,
    ) -> Subscription {
        self.register(Some(kind), handler)
    }

    /// Subscribes a closure to one event category.
    pub fn on<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&NidoEvent) + Send + Sync + 'static,
    {
        self.subscribe_filtered(kind, Arc::new(CallbackHandler::new(callback)))
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.inner.lock().expect("event bus poisoned").handlers.len()
    }

    /// Dispatches an event to all matching handlers.
    pub fn emit(&self, event: &NidoEvent) {
        // Snapshot under the lock, dispatch outside it: a handler may
        // subscribe or drop subscriptions while running.
        let handlers: Vec<Arc<dyn EventHandler>> = {
            let inner = self.inner.lock().expect("event bus poisoned");
            inner
                .handlers
                .iter()
                .filter(|entry| entry.filter.is_none() || entry.filter == Some(event.kind()))
                .map(|entry| Arc::clone(&entry.handler))
                .collect()
        };

        for handler in handlers {
            handler.on_event(event);
        }
    }

    fn register(&self, filter: Option<EventKind>, handler: Arc<dyn EventHandler>) -> Subscription {
        let mut inner = self.inner.lock().expect("event bus poisoned");
        inner.next_id += 1;
        let id = inner.next_id;
        inner.handlers.push(HandlerEntry {
            id,
            filter,
            handler,
        });

        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }
}

/// Disposer for a registered handler.
///
/// Dropping it unregisters the handler. Hold it for as long as deliveries
/// are wanted.
#[must_use = "dropping a Subscription immediately unsubscribes its handler"]
pub struct Subscription {
    bus: Weak<Mutex<BusInner>>,
    id: u64,
}

impl Subscription {
    /// Explicitly unsubscribes. Equivalent to dropping.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            if let Ok(mut inner) = inner.lock() {
                inner.handlers.retain(|entry| entry.id != self.id);
            }
        }
    }
}
