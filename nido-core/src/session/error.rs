// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session error types.

use thiserror::Error;

use crate::rest::RestError;
use crate::storage::StorageError;

/// Session error types.
///
/// `NoToken` and `SessionExpired` are fatal to the session: by the time
/// the caller sees them the store has already cleared in-memory and
/// persisted state. `Auth` and `Request` leave the session untouched.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Login rejected: bad credentials. Never retried automatically.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// An authenticated call was attempted with no session present.
    #[error("no session token present")]
    NoToken,

    /// The server rejected a token that was present.
    #[error("session expired")]
    SessionExpired,

    /// Any other non-2xx response, carrying the server-provided message.
    #[error("request failed ({status}): {message}")]
    Request { status: u16, message: String },

    /// The server could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] RestError),

    /// The session cache failed.
    #[error("cache error: {0}")]
    Cache(#[from] StorageError),

    /// A response body did not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
