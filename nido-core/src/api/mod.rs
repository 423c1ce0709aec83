// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Nido API Layer
//!
//! High-level facade over the session store, the realtime connection
//! manager and the unread/presence reconciler.
//!
//! # Overview
//!
//! The API layer provides the surface UI shells embed:
//! - Session lifecycle (login, logout, restore)
//! - Realtime connection lifecycle with forced re-initialization
//! - The cooperative pump (`tick`) that drives reconnects, event
//!   reconciliation and the periodic authoritative pull
//! - A typed event bus with disposer-based subscriptions
//!
//! # Module Structure
//!
//! - [`error`] - Unified error type for the facade
//! - [`config`] - Configuration types
//! - [`events`] - Event bus, event types, subscriptions
//! - [`client`] - Main Nido orchestrator

#[cfg(feature = "testing")]
pub mod client;
#[cfg(not(feature = "testing"))]
mod client;

#[cfg(feature = "testing")]
pub mod config;
#[cfg(not(feature = "testing"))]
mod config;

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod events;
#[cfg(not(feature = "testing"))]
mod events;

// Error types
pub use error::{NidoError, NidoResult};

// Configuration
pub use config::NidoConfig;

// Events
pub use events::{
    CallbackHandler, EventBus, EventHandler, EventKind, NidoEvent, Subscription,
};

// Orchestrator
pub use client::Nido;
