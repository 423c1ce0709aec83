// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Unread/Presence Reconciliation
//!
//! Consumes realtime events and authoritative poll responses to maintain
//! a single source of truth for the unread message count and who is
//! online.

#[cfg(feature = "testing")]
pub mod reconciler;
#[cfg(not(feature = "testing"))]
mod reconciler;

#[cfg(feature = "testing")]
pub mod state;
#[cfg(not(feature = "testing"))]
mod state;

pub use reconciler::{ReconcileChanges, Reconciler, UnreadCountSource};
pub use state::NotificationState;
