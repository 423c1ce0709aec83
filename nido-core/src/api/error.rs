// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! API Error Types
//!
//! Unified error type for the Nido facade.

use thiserror::Error;

use crate::network::NetworkError;
use crate::session::SessionError;
use crate::storage::StorageError;

/// Unified error type for Nido operations.
#[derive(Error, Debug)]
pub enum NidoError {
    /// Session operation failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Network operation failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Session cache operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for Nido operations.
pub type NidoResult<T> = Result<T, NidoError>;
