// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Network error types.

use thiserror::Error;

/// Network error types.
///
/// None of these escapes the connection manager to its callers: transport
/// failures degrade to status changes and reconnect scheduling.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },
}

/// Result type for network operations.
pub type NetworkResult<T> = Result<T, NetworkError>;
