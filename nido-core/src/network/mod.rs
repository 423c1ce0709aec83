//! Realtime Connection Layer
//!
//! Owns the single duplex connection to the realtime server and the typed
//! event contract flowing over it.
//!
//! # Architecture
//!
//! - **Transport trait**: platform-agnostic interface for the channel
//! - **Event types**: realtime wire contract (room membership out,
//!   message/read/count/presence events in)
//! - **Protocol layer**: JSON frame encoding and decoding
//! - **Connection manager**: lazy connect, bounded backoff, room join,
//!   caller-pumped event drain
//!
//! Transport failures never escape this layer as errors; they become
//! status changes and reconnect scheduling.

#[cfg(feature = "testing")]
pub mod connection;
#[cfg(not(feature = "testing"))]
mod connection;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod event;
#[cfg(not(feature = "testing"))]
mod event;

#[cfg(feature = "testing")]
pub mod mock;
#[cfg(not(feature = "testing"))]
mod mock;

#[cfg(feature = "testing")]
pub mod protocol;
#[cfg(not(feature = "testing"))]
mod protocol;

#[cfg(feature = "testing")]
pub mod transport;
#[cfg(not(feature = "testing"))]
mod transport;

#[cfg(feature = "testing")]
pub mod websocket;
#[cfg(not(feature = "testing"))]
mod websocket;

// Error types
pub use error::{NetworkError, NetworkResult};

// Event types
pub use event::{ChatMessage, ClientEvent, ServerEvent};

// Protocol utilities
pub use protocol::{decode_server_event, encode_client_event, encode_server_event, MAX_FRAME_SIZE};

// Transport abstraction
pub use transport::{ConnectionState, RealtimeConfig, Transport, TransportResult};

// Mock transport for testing
pub use mock::MockTransport;

// WebSocket transport for production
pub use websocket::WebSocketTransport;

// Connection management
pub use connection::{ConnectionManager, RealtimeStatus};
