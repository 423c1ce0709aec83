// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection Manager
//!
//! Owns the single realtime connection: lazy connect, bounded exponential
//! backoff, room membership, caller-pumped event drain. The manager never
//! sleeps; `maintain` performs due retries using the clock the caller
//! passes in.
//!
//! The credential is captured at construction and presented once per
//! handshake. A manager that has been torn down is finished: re-login
//! constructs a new instance instead of mutating this one.

use tracing::{debug, info, warn};

use crate::session::{AuthToken, UserId};

use super::error::{NetworkError, NetworkResult};
use super::event::{ClientEvent, ServerEvent};
use super::transport::{ConnectionState, RealtimeConfig, Transport};

/// Manager-level connection status, as surfaced to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeStatus {
    /// No connect has been attempted (or no token was available).
    Uninitialized,
    /// Handshake in progress.
    Connecting,
    /// Connected and joined to the user's room.
    Connected,
    /// Lost or failed; an automatic retry is scheduled.
    Reconnecting { attempt: u32 },
    /// Every automatic attempt failed. A manual `connect` starts over.
    Failed,
    /// Explicitly shut down. Terminal for this instance.
    TornDown,
}

/// Connection manager for the realtime channel.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    config: RealtimeConfig,
    /// One-time credential, captured at construction.
    token: Option<AuthToken>,
    /// Room identifier: the authenticated user's id.
    user_id: UserId,
    status: RealtimeStatus,
    attempt: u32,
    next_retry_at_ms: Option<u64>,
}

impl<T: Transport> ConnectionManager<T> {
    /// Creates a manager over a transport.
    ///
    /// `token` is the credential snapshot at construction time; a manager
    /// built without one never touches the transport.
    pub fn new(
        transport: T,
        config: RealtimeConfig,
        token: Option<AuthToken>,
        user_id: UserId,
    ) -> Self {
        ConnectionManager {
            transport,
            config,
            token,
            user_id,
            status: RealtimeStatus::Uninitialized,
            attempt: 0,
            next_retry_at_ms: None,
        }
    }

    /// Current manager status.
    pub fn status(&self) -> RealtimeStatus {
        self.status
    }

    /// Returns true if connected.
    pub fn is_connected(&self) -> bool {
        self.status == RealtimeStatus::Connected
    }

    /// The room this manager joins: the user's id.
    pub fn room(&self) -> UserId {
        self.user_id
    }

    /// Initiates a connection.
    ///
    /// No-op when already `Connected` or `Connecting`; logged no-op when no
    /// token is present (stays `Uninitialized`, the transport is never
    /// touched) or when torn down. From `Failed`, the attempt counter is
    /// reset and the cycle starts over.
    pub fn connect(&mut self, now_ms: u64) {
        match self.status {
            RealtimeStatus::Connected | RealtimeStatus::Connecting => return,
            RealtimeStatus::TornDown => {
                warn!("connect called on a torn-down connection");
                return;
            }
            RealtimeStatus::Failed => {
                debug!("manual connect after failure, resetting attempts");
                self.attempt = 0;
            }
            RealtimeStatus::Uninitialized | RealtimeStatus::Reconnecting { .. } => {}
        }

        if self.token.is_none() {
            warn!("connect requested without a session token");
            return;
        }

        self.try_connect(now_ms);
    }

    /// Tears the connection down: best-effort `leave_room`, transport
    /// close, terminal `TornDown` status. Idempotent.
    pub fn disconnect(&mut self) {
        if self.status == RealtimeStatus::TornDown {
            return;
        }

        if self.status == RealtimeStatus::Connected {
            let leave = ClientEvent::LeaveRoom {
                user_id: self.user_id,
            };
            if let Err(e) = self.transport.send(&leave) {
                debug!(error = %e, "leave_room not delivered during teardown");
            }
        }

        if let Err(e) = self.transport.disconnect() {
            debug!(error = %e, "transport close failed during teardown");
        }
        self.status = RealtimeStatus::TornDown;
        self.next_retry_at_ms = None;
        info!("realtime connection torn down");
    }

    /// Sends a fire-and-forget client event.
    pub fn emit(&mut self, event: &ClientEvent) -> NetworkResult<()> {
        if self.status != RealtimeStatus::Connected {
            return Err(NetworkError::NotConnected);
        }
        self.transport.send(event)
    }

    /// Drives the connection lifecycle: performs a due retry, or detects a
    /// dropped transport and schedules reconnection.
    ///
    /// On a drop no `leave_room` is sent; the server notices the dead
    /// connection itself.
    pub fn maintain(&mut self, now_ms: u64) {
        match self.status {
            RealtimeStatus::Reconnecting { .. } => {
                if self.next_retry_at_ms.is_some_and(|at| now_ms >= at) {
                    self.try_connect(now_ms);
                }
            }
            RealtimeStatus::Connected => {
                if self.transport.state() != ConnectionState::Connected {
                    warn!("realtime transport dropped, scheduling reconnect");
                    self.schedule_retry(now_ms);
                }
            }
            _ => {}
        }
    }

    /// Drains pending server events in arrival order.
    ///
    /// A transport error while draining degrades to reconnect scheduling;
    /// events received before the error are still returned.
    pub fn poll_events(&mut self, now_ms: u64) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        if self.status != RealtimeStatus::Connected {
            return events;
        }

        loop {
            match self.transport.receive() {
                Ok(Some(event)) => events.push(event),
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "receive failed, scheduling reconnect");
                    self.schedule_retry(now_ms);
                    break;
                }
            }
        }
        events
    }

    fn try_connect(&mut self, now_ms: u64) {
        let token = match &self.token {
            Some(token) => token.clone(),
            None => return,
        };

        self.status = RealtimeStatus::Connecting;
        debug!(url = %self.config.server_url, attempt = self.attempt + 1, "connecting");

        match self.transport.connect(&self.config, &token) {
            Ok(()) => {
                self.status = RealtimeStatus::Connected;
                self.attempt = 0;
                self.next_retry_at_ms = None;
                info!(room = self.user_id, "realtime connected, joining room");

                let join = ClientEvent::JoinRoom {
                    user_id: self.user_id,
                };
                if let Err(e) = self.transport.send(&join) {
                    warn!(error = %e, "join_room failed, scheduling reconnect");
                    self.schedule_retry(now_ms);
                }
            }
            Err(e) => {
                warn!(error = %e, "connect attempt failed");
                self.schedule_retry(now_ms);
            }
        }
    }

    /// Counts a failed attempt and either schedules the next retry with
    /// exponential backoff or gives up into `Failed`.
    fn schedule_retry(&mut self, now_ms: u64) {
        self.attempt += 1;

        if self.attempt >= self.config.max_connect_attempts {
            warn!(
                attempts = self.attempt,
                "connect attempts exhausted, giving up"
            );
            self.status = RealtimeStatus::Failed;
            self.next_retry_at_ms = None;
            return;
        }

        let delay_ms = self.config.reconnect_base_delay_ms << (self.attempt - 1).min(6);
        self.status = RealtimeStatus::Reconnecting {
            attempt: self.attempt,
        };
        self.next_retry_at_ms = Some(now_ms + delay_ms);
        debug!(attempt = self.attempt, delay_ms, "reconnect scheduled");
    }

    /// Returns a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a mutable reference to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

// Tests private attempt counter, backoff schedule and internal transitions.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::mock::MockTransport;

    fn test_config() -> RealtimeConfig {
        RealtimeConfig {
            server_url: "ws://localhost:4100".into(),
            max_connect_attempts: 5,
            reconnect_base_delay_ms: 1_000,
            ..Default::default()
        }
    }

    fn token() -> Option<AuthToken> {
        Some(AuthToken::new("tok-1"))
    }

    #[test]
    fn test_connect_joins_room() {
        let mut conn = ConnectionManager::new(MockTransport::new(), test_config(), token(), 7);
        conn.connect(0);

        assert_eq!(conn.status(), RealtimeStatus::Connected);
        assert_eq!(
            conn.transport().sent_events(),
            &[ClientEvent::JoinRoom { user_id: 7 }]
        );
    }

    #[test]
    fn test_connect_without_token_touches_nothing() {
        let mut conn = ConnectionManager::new(MockTransport::new(), test_config(), None, 7);
        conn.connect(0);

        assert_eq!(conn.status(), RealtimeStatus::Uninitialized);
        assert_eq!(conn.transport().connect_attempts(), 0);
    }

    #[test]
    fn test_connect_is_noop_when_connected() {
        let mut conn = ConnectionManager::new(MockTransport::new(), test_config(), token(), 7);
        conn.connect(0);
        conn.connect(0);

        assert_eq!(conn.transport().connect_attempts(), 1);
    }

    #[test]
    fn test_backoff_schedule_doubles() {
        let mut transport = MockTransport::new();
        transport.fail_next_connects(3);
        let mut conn = ConnectionManager::new(transport, test_config(), token(), 7);

        conn.connect(0);
        assert_eq!(conn.status(), RealtimeStatus::Reconnecting { attempt: 1 });
        assert_eq!(conn.next_retry_at_ms, Some(1_000));

        conn.maintain(1_000);
        assert_eq!(conn.status(), RealtimeStatus::Reconnecting { attempt: 2 });
        assert_eq!(conn.next_retry_at_ms, Some(1_000 + 2_000));

        conn.maintain(3_000);
        assert_eq!(conn.status(), RealtimeStatus::Reconnecting { attempt: 3 });
        assert_eq!(conn.next_retry_at_ms, Some(3_000 + 4_000));

        // Fourth attempt succeeds
        conn.maintain(7_000);
        assert_eq!(conn.status(), RealtimeStatus::Connected);
        assert_eq!(conn.attempt, 0);
    }

    #[test]
    fn test_exhausted_attempts_reach_failed() {
        let mut transport = MockTransport::new();
        transport.fail_next_connects(5);
        let mut conn = ConnectionManager::new(transport, test_config(), token(), 7);

        conn.connect(0);
        let mut now = 0;
        while matches!(conn.status(), RealtimeStatus::Reconnecting { .. }) {
            now += 100_000; // Far past any backoff delay
            conn.maintain(now);
        }

        assert_eq!(conn.status(), RealtimeStatus::Failed);
        assert_eq!(conn.transport().connect_attempts(), 5);

        // Failed is sticky under maintain
        conn.maintain(now + 100_000);
        assert_eq!(conn.status(), RealtimeStatus::Failed);
    }

    #[test]
    fn test_manual_connect_after_failure_resets_attempts() {
        let mut transport = MockTransport::new();
        transport.fail_next_connects(5);
        let mut conn = ConnectionManager::new(transport, test_config(), token(), 7);

        conn.connect(0);
        let mut now = 0;
        while matches!(conn.status(), RealtimeStatus::Reconnecting { .. }) {
            now += 100_000;
            conn.maintain(now);
        }
        assert_eq!(conn.status(), RealtimeStatus::Failed);

        // Sixth, manual connect starts a fresh cycle and succeeds
        conn.connect(now);
        assert_eq!(conn.status(), RealtimeStatus::Connected);
        assert_eq!(conn.attempt, 0);
    }

    #[test]
    fn test_transport_drop_schedules_reconnect_without_leave() {
        let mut conn = ConnectionManager::new(MockTransport::new(), test_config(), token(), 7);
        conn.connect(0);

        conn.transport_mut().set_state(ConnectionState::Disconnected);
        conn.maintain(10);

        assert_eq!(conn.status(), RealtimeStatus::Reconnecting { attempt: 1 });
        // join_room only; no leave_room was sent for the drop
        assert_eq!(
            conn.transport().sent_events(),
            &[ClientEvent::JoinRoom { user_id: 7 }]
        );
    }

    #[test]
    fn test_reconnect_rejoins_room() {
        let mut conn = ConnectionManager::new(MockTransport::new(), test_config(), token(), 7);
        conn.connect(0);

        conn.transport_mut().set_state(ConnectionState::Disconnected);
        conn.maintain(10);
        conn.maintain(10 + 1_000);

        assert_eq!(conn.status(), RealtimeStatus::Connected);
        assert_eq!(
            conn.transport().sent_events(),
            &[
                ClientEvent::JoinRoom { user_id: 7 },
                ClientEvent::JoinRoom { user_id: 7 },
            ]
        );
    }

    #[test]
    fn test_disconnect_leaves_room_and_is_terminal() {
        let mut conn = ConnectionManager::new(MockTransport::new(), test_config(), token(), 7);
        conn.connect(0);
        conn.disconnect();

        assert_eq!(conn.status(), RealtimeStatus::TornDown);
        assert_eq!(
            conn.transport().sent_events(),
            &[
                ClientEvent::JoinRoom { user_id: 7 },
                ClientEvent::LeaveRoom { user_id: 7 },
            ]
        );

        // Terminal: connect after teardown stays torn down
        conn.connect(0);
        assert_eq!(conn.status(), RealtimeStatus::TornDown);

        // And disconnect is idempotent
        conn.disconnect();
        assert_eq!(conn.status(), RealtimeStatus::TornDown);
    }

    #[test]
    fn test_poll_events_drains_in_order() {
        let mut transport = MockTransport::new();
        transport.queue_receive(ServerEvent::UserConnected { user_id: 3 });
        transport.queue_receive(ServerEvent::UnreadCountUpdate {
            user_id: 7,
            count: 2,
        });
        let mut conn = ConnectionManager::new(transport, test_config(), token(), 7);
        conn.connect(0);

        let events = conn.poll_events(0);
        assert_eq!(
            events,
            vec![
                ServerEvent::UserConnected { user_id: 3 },
                ServerEvent::UnreadCountUpdate {
                    user_id: 7,
                    count: 2
                },
            ]
        );
        assert!(conn.poll_events(0).is_empty());
    }
}
