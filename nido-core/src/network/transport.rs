//! Realtime Transport Trait
//!
//! Platform-agnostic abstraction for the duplex realtime channel.

use crate::session::AuthToken;

use super::error::NetworkError;
use super::event::{ClientEvent, ServerEvent};

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Transport-level connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to any server.
    #[default]
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Connected and ready.
    Connected,
}

/// Configuration for the realtime connection.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Realtime server URL (`ws://` or `wss://`).
    pub server_url: String,
    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Read/write timeout in milliseconds. Also bounds how long a single
    /// `receive` poll blocks.
    pub io_timeout_ms: u64,
    /// Maximum automatic connect attempts before giving up.
    pub max_connect_attempts: u32,
    /// Base delay for exponential backoff (milliseconds).
    pub reconnect_base_delay_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        RealtimeConfig {
            server_url: String::new(),
            connect_timeout_ms: 10_000,
            io_timeout_ms: 250,
            max_connect_attempts: 5,
            reconnect_base_delay_ms: 1_000,
        }
    }
}

/// Transport trait for the realtime channel.
///
/// Abstracts the underlying mechanism (WebSocket in production) so the
/// connection manager can be exercised against mocks. The interface is
/// synchronous and pumped by the caller; implementations must make
/// `receive` return `Ok(None)` rather than block indefinitely when no
/// event is available.
pub trait Transport: Send {
    /// Connects to the realtime server, presenting the bearer credential
    /// once as part of the handshake.
    fn connect(&mut self, config: &RealtimeConfig, auth: &AuthToken) -> TransportResult<()>;

    /// Disconnects from the server. Safe to call when not connected.
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Returns the current connection state.
    fn state(&self) -> ConnectionState;

    /// Sends a client event. Returns an error if not connected.
    fn send(&mut self, event: &ClientEvent) -> TransportResult<()>;

    /// Receives the next server event, or `Ok(None)` when nothing is
    /// pending within the transport's poll window.
    fn receive(&mut self) -> TransportResult<Option<ServerEvent>>;

    /// Checks if there are pending events to receive (non-blocking).
    fn has_pending(&self) -> bool;
}
