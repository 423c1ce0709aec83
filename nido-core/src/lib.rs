//! Nido Core Library
//!
//! Session and realtime notification core for the Nido daycare management
//! platform. Holds the authenticated session, owns the single reconnecting
//! realtime connection, and reconciles push events with authoritative
//! pulls into one consistent unread/presence state. UI rendering, routing
//! and the backend itself are external collaborators.

#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub mod api;
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub mod network;
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub mod reconcile;
pub mod rest;
pub mod session;
pub mod storage;

#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use api::{
    EventBus, EventHandler, EventKind, Nido, NidoConfig, NidoError, NidoEvent, NidoResult,
    Subscription,
};
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use network::{
    ChatMessage, ClientEvent, ConnectionManager, ConnectionState, MockTransport, NetworkError,
    RealtimeConfig, RealtimeStatus, ServerEvent, Transport, WebSocketTransport,
};
#[cfg(any(feature = "network-native-tls", feature = "network-rustls"))]
pub use reconcile::{NotificationState, ReconcileChanges, Reconciler, UnreadCountSource};
pub use rest::{
    ApiRequest, ApiResponse, Method, MockRestTransport, RestConfig, RestError, RestTransport,
};
#[cfg(feature = "rest-reqwest")]
pub use rest::ReqwestRestTransport;
pub use session::{
    AuthToken, Capability, Destination, Entitlements, Role, Session, SessionError, SessionStore,
    UserId, UserProfile,
};
pub use storage::{SessionCache, StorageError};
