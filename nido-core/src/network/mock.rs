// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! In-memory transport for tests: queue inbound events, record outbound
//! events and the credentials presented at connect time, script connect
//! failures.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::session::AuthToken;

use super::error::NetworkError;
use super::event::{ClientEvent, ServerEvent};
use super::transport::{ConnectionState, RealtimeConfig, Transport, TransportResult};

/// Mock transport for testing.
#[derive(Default)]
pub struct MockTransport {
    state: ConnectionState,
    sent: Vec<ClientEvent>,
    rx_queue: VecDeque<ServerEvent>,
    /// Number of upcoming connect calls that should fail.
    fail_connects: u32,
    connect_attempts: u32,
    /// Tokens presented at connect, in order.
    auths: Vec<String>,
    /// Shared counter of transports currently connected, for
    /// at-most-one-connection assertions across instances.
    live: Option<Arc<AtomicUsize>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a shared live-connection counter, incremented on connect
    /// and decremented on disconnect or drop.
    pub fn with_live_counter(counter: Arc<AtomicUsize>) -> Self {
        let mut transport = Self::default();
        transport.live = Some(counter);
        transport
    }

    /// Scripts the next `n` connect calls to fail.
    pub fn fail_next_connects(&mut self, n: u32) {
        self.fail_connects = n;
    }

    /// Queues an inbound server event.
    pub fn queue_receive(&mut self, event: ServerEvent) {
        self.rx_queue.push_back(event);
    }

    /// Everything sent through this transport so far.
    pub fn sent_events(&self) -> &[ClientEvent] {
        &self.sent
    }

    /// Total connect calls, successful or not.
    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    /// Tokens presented at connect, in order.
    pub fn auths(&self) -> &[String] {
        &self.auths
    }

    /// Forces the transport into a state, simulating e.g. a network drop.
    pub fn set_state(&mut self, state: ConnectionState) {
        if self.state == ConnectionState::Connected && state != ConnectionState::Connected {
            self.mark_dead();
        }
        self.state = state;
    }

    fn mark_dead(&mut self) {
        if let Some(live) = &self.live {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _config: &RealtimeConfig, auth: &AuthToken) -> TransportResult<()> {
        self.connect_attempts += 1;
        self.auths.push(auth.as_str().to_string());

        if self.fail_connects > 0 {
            self.fail_connects -= 1;
            self.state = ConnectionState::Disconnected;
            return Err(NetworkError::ConnectionFailed("scripted failure".into()));
        }

        if self.state != ConnectionState::Connected {
            if let Some(live) = &self.live {
                live.fetch_add(1, Ordering::SeqCst);
            }
            self.state = ConnectionState::Connected;
        }
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        if self.state == ConnectionState::Connected {
            self.mark_dead();
        }
        self.state = ConnectionState::Disconnected;
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn send(&mut self, event: &ClientEvent) -> TransportResult<()> {
        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }
        self.sent.push(event.clone());
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<ServerEvent>> {
        if self.state != ConnectionState::Connected {
            return Err(NetworkError::NotConnected);
        }
        Ok(self.rx_queue.pop_front())
    }

    fn has_pending(&self) -> bool {
        !self.rx_queue.is_empty()
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        if self.state == ConnectionState::Connected {
            self.mark_dead();
        }
    }
}
