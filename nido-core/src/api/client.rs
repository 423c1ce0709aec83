// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Nido Orchestrator
//!
//! Main entry point: wires the session store, the realtime connection
//! manager and the reconciler together and pumps them cooperatively.
//!
//! # Example
//!
//! ```ignore
//! use nido_core::api::{Nido, NidoConfig, EventKind};
//!
//! let mut nido = Nido::with_default_transports(NidoConfig::with_servers(
//!     "https://api.nido.example",
//!     "wss://rt.nido.example",
//! ))?;
//!
//! let _sub = nido.events().on(EventKind::UnreadCount, |event| {
//!     println!("unread changed: {:?}", event);
//! });
//!
//! nido.restore_session()?;
//! nido.login("parent@example.com", "secret")?;
//!
//! loop {
//!     nido.tick();
//!     std::thread::sleep(std::time::Duration::from_millis(250));
//! }
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::network::{
    ConnectionManager, MockTransport, RealtimeStatus, ServerEvent, Transport,
};
use crate::reconcile::{ReconcileChanges, Reconciler};
use crate::rest::{Method, MockRestTransport, RestTransport};
use crate::session::{
    Capability, Destination, Session, SessionError, SessionStore, UserProfile,
};
use crate::storage::SessionCache;

use super::config::NidoConfig;
use super::error::{NidoError, NidoResult};
use super::events::{EventBus, NidoEvent};

/// Returns the current Unix timestamp in milliseconds.
/// Falls back to 0 if the system clock is before UNIX_EPOCH (should never happen).
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Main Nido orchestrator.
///
/// Owns the session store, at most one realtime connection manager at a
/// time, and the reconciler. UI shells subscribe to [`EventBus`] events
/// and re-render from the read surface; they never touch the transports
/// directly.
pub struct Nido<R: RestTransport, T: Transport> {
    config: NidoConfig,
    store: SessionStore<R>,
    realtime: Option<ConnectionManager<T>>,
    /// Builds a fresh transport for each connection instance, so
    /// `force_new` is destroy-then-construct rather than mutation.
    transport_factory: Box<dyn Fn() -> T + Send>,
    reconciler: Reconciler,
    events: EventBus,
    /// Last status surfaced to subscribers, for change detection.
    last_status: RealtimeStatus,
}

impl Nido<MockRestTransport, MockTransport> {
    /// Creates a Nido instance with mock transports and in-memory storage
    /// (for testing).
    pub fn in_memory() -> NidoResult<Self> {
        let cache = SessionCache::in_memory()?;
        Ok(Self::with_cache(
            NidoConfig::default(),
            MockRestTransport::new(),
            cache,
            MockTransport::new,
        ))
    }
}

impl<R: RestTransport, T: Transport> Nido<R, T> {
    /// Creates a Nido instance, opening (or creating) the session cache at
    /// the configured path.
    pub fn new<F>(config: NidoConfig, rest: R, transport_factory: F) -> NidoResult<Self>
    where
        F: Fn() -> T + Send + 'static,
    {
        if let Some(parent) = config.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| NidoError::Configuration(e.to_string()))?;
            }
        }
        let cache = SessionCache::open(&config.storage_path)?;
        Ok(Self::with_cache(config, rest, cache, transport_factory))
    }

    /// Creates a Nido instance over an already-open session cache.
    pub fn with_cache<F>(
        config: NidoConfig,
        rest: R,
        cache: SessionCache,
        transport_factory: F,
    ) -> Self
    where
        F: Fn() -> T + Send + 'static,
    {
        let reconciler = Reconciler::new(config.unread_poll_interval_ms);
        Nido {
            config,
            store: SessionStore::new(rest, cache),
            realtime: None,
            transport_factory: Box::new(transport_factory),
            reconciler,
            events: EventBus::new(),
            last_status: RealtimeStatus::Uninitialized,
        }
    }

    /// The event bus. Subscribe here; hold the returned `Subscription`
    /// for as long as deliveries are wanted.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // === Session lifecycle ===

    /// Restores a persisted session. Returns true if one was restored, in
    /// which case the realtime layer is initialized and an initial
    /// authoritative pull runs.
    pub fn restore_session(&mut self) -> NidoResult<bool> {
        let user_id = match self.store.restore_session()? {
            Some(session) => session.user.id,
            None => return Ok(false),
        };
        self.events.emit(&NidoEvent::LoggedIn { user_id });
        self.begin_session(user_id);
        Ok(true)
    }

    /// Logs in and starts the realtime/reconciliation machinery.
    ///
    /// Emits a `Navigate` event to the role's landing destination.
    pub fn login(&mut self, email: &str, password: &str) -> NidoResult<UserProfile> {
        let user = self.store.login(email, password)?.user.clone();

        self.events.emit(&NidoEvent::LoggedIn { user_id: user.id });
        self.events.emit(&NidoEvent::Navigate {
            destination: user.role.landing(),
        });
        self.begin_session(user.id);
        Ok(user)
    }

    /// Logs out.
    ///
    /// Ordering matters: session state is cleared synchronously first, so
    /// the connection teardown that follows can never race a reconnect
    /// with a stale token.
    pub fn logout(&mut self) {
        self.store.logout();
        self.teardown_realtime();
        self.reconciler.clear();
        self.events.emit(&NidoEvent::LoggedOut);
        self.events.emit(&NidoEvent::Navigate {
            destination: Destination::Login,
        });
    }

    fn begin_session(&mut self, user_id: crate::session::UserId) {
        if !self.store.allows(Capability::Messaging) {
            debug!("account not entitled to messaging, notification layer stays idle");
            return;
        }

        let now = now_ms();
        self.reconciler.start_session(user_id);
        self.initialize_realtime(false);
        self.connect_at(now);

        let changes = self.reconciler.pull_now(now, &mut self.store);
        self.emit_changes(changes);
    }

    // === Realtime lifecycle ===

    /// Ensures a connection manager exists for the current session.
    ///
    /// With `force_new`, any existing manager is torn down first and a
    /// fresh one is constructed — the path a re-login takes, so no stale
    /// credential or room membership survives into the new session. No
    /// manager is created when there is no session or the account lacks
    /// the messaging capability.
    pub fn initialize_realtime(&mut self, force_new: bool) {
        if force_new {
            self.teardown_realtime();
            self.realtime = None;
        }

        // A torn-down manager is terminal; replace it like none existed.
        if self
            .realtime
            .as_ref()
            .is_some_and(|m| m.status() != RealtimeStatus::TornDown)
        {
            return;
        }

        let session = match self.store.session() {
            Some(session) => session,
            None => {
                debug!("no session, realtime stays uninitialized");
                return;
            }
        };
        if !session.entitlements.allows(Capability::Messaging) {
            debug!("account not entitled to messaging, realtime disabled");
            return;
        }

        let manager = ConnectionManager::new(
            (self.transport_factory)(),
            self.config.realtime.clone(),
            Some(session.token.clone()),
            session.user.id,
        );
        self.realtime = Some(manager);
        self.sync_status();
    }

    /// Initiates a realtime connection. No-op without an initialized
    /// manager, or when already connected/connecting/torn down.
    pub fn connect(&mut self) {
        self.connect_at(now_ms());
    }

    /// Tears the realtime connection down without ending the session.
    pub fn disconnect(&mut self) {
        self.teardown_realtime();
    }

    fn connect_at(&mut self, now_ms: u64) {
        if let Some(manager) = self.realtime.as_mut() {
            manager.connect(now_ms);
        }
        self.sync_status();
    }

    fn teardown_realtime(&mut self) {
        if let Some(manager) = self.realtime.as_mut() {
            manager.disconnect();
        }
        self.sync_status();
    }

    // === Cooperative pump ===

    /// Drives the core using the wall clock. Call from the host's idle or
    /// timer loop.
    pub fn tick(&mut self) {
        self.tick_at(now_ms());
    }

    /// Drives the core with an explicit clock: performs due reconnects,
    /// drains realtime events into the reconciler, and runs the periodic
    /// authoritative pull.
    pub fn tick_at(&mut self, now_ms: u64) {
        // A 401 on any guarded request may have ended the session since
        // the last tick; the connection must not outlive it.
        if !self.store.is_authenticated() {
            if self
                .realtime
                .as_ref()
                .is_some_and(|m| m.status() != RealtimeStatus::TornDown)
            {
                debug!("session gone, tearing down realtime");
            }
            self.teardown_realtime();
            self.reconciler.clear();
            return;
        }

        let events = match self.realtime.as_mut() {
            Some(manager) => {
                manager.maintain(now_ms);
                manager.poll_events(now_ms)
            }
            None => Vec::new(),
        };
        self.sync_status();

        for event in &events {
            if let ServerEvent::NewMessage {
                receiver_id,
                message,
            } = event
            {
                if Some(*receiver_id) == self.reconciler.current_user() {
                    self.events.emit(&NidoEvent::MessageReceived {
                        message: message.clone(),
                    });
                }
            }

            let changes = self.reconciler.handle_event(event, &mut self.store);
            self.emit_changes(changes);
        }

        let changes = self.reconciler.poll_if_due(now_ms, &mut self.store);
        self.emit_changes(changes);

        // The pull may have hit a 401 and ended the session.
        if !self.store.is_authenticated() {
            self.teardown_realtime();
            self.reconciler.clear();
        }
    }

    // === Guarded requests ===

    /// Executes an authenticated request through the session store's
    /// guarded wrapper, mapping session loss to the navigation side
    /// effect.
    pub fn authenticated_request<D: DeserializeOwned>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> NidoResult<D> {
        match self.store.authenticated_request(method, path, body) {
            Ok(value) => Ok(value),
            Err(e) => {
                match &e {
                    SessionError::SessionExpired => {
                        self.events.emit(&NidoEvent::SessionExpired);
                        self.handle_auth_loss();
                    }
                    SessionError::NoToken => {
                        self.handle_auth_loss();
                    }
                    _ => {}
                }
                Err(NidoError::Session(e))
            }
        }
    }

    fn handle_auth_loss(&mut self) {
        // The store has already cleared its state; finish the teardown.
        self.teardown_realtime();
        self.reconciler.clear();
        self.events.emit(&NidoEvent::Navigate {
            destination: Destination::Login,
        });
    }

    // === Read surface ===

    /// The current session, if authenticated.
    pub fn session(&self) -> Option<&Session> {
        self.store.session()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Whether the current account is entitled to a capability.
    pub fn allows(&self, capability: Capability) -> bool {
        self.store.allows(capability)
    }

    /// Current realtime status. `Uninitialized` when no manager exists.
    pub fn realtime_status(&self) -> RealtimeStatus {
        self.realtime
            .as_ref()
            .map(|m| m.status())
            .unwrap_or(RealtimeStatus::Uninitialized)
    }

    /// Reconciled unread count.
    pub fn unread_count(&self) -> u32 {
        self.reconciler.unread_count()
    }

    /// Reconciled notification state.
    pub fn notification_state(&self) -> &crate::reconcile::NotificationState {
        self.reconciler.state()
    }

    /// Returns a reference to the session store.
    pub fn session_store(&self) -> &SessionStore<R> {
        &self.store
    }

    /// Returns a mutable reference to the session store.
    pub fn session_store_mut(&mut self) -> &mut SessionStore<R> {
        &mut self.store
    }

    /// Returns a reference to the connection manager, if initialized.
    pub fn realtime(&self) -> Option<&ConnectionManager<T>> {
        self.realtime.as_ref()
    }

    /// Returns a mutable reference to the connection manager, if initialized.
    pub fn realtime_mut(&mut self) -> Option<&mut ConnectionManager<T>> {
        self.realtime.as_mut()
    }

    fn emit_changes(&mut self, changes: ReconcileChanges) {
        if let Some(count) = changes.unread_count {
            self.events.emit(&NidoEvent::UnreadCountChanged { count });
        }
        for (user_id, online) in changes.presence {
            self.events
                .emit(&NidoEvent::PresenceChanged { user_id, online });
        }
    }

    /// Emits a status-change event when the surfaced status moved.
    fn sync_status(&mut self) {
        let status = self.realtime_status();
        if status != self.last_status {
            self.last_status = status;
            self.events
                .emit(&NidoEvent::RealtimeStatusChanged { status });
        }
    }
}

#[cfg(feature = "rest-reqwest")]
impl Nido<crate::rest::ReqwestRestTransport, crate::network::WebSocketTransport> {
    /// Creates a production instance: reqwest REST transport plus the
    /// WebSocket realtime transport, both pointed at the configured
    /// servers.
    pub fn with_default_transports(config: NidoConfig) -> NidoResult<Self> {
        let rest = crate::rest::ReqwestRestTransport::new(&config.rest)
            .map_err(|e| NidoError::Configuration(e.to_string()))?;
        Self::new(config, rest, crate::network::WebSocketTransport::new)
    }
}
