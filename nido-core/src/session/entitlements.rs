// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Feature entitlement snapshot.
//!
//! A capability set fetched once at login and cached with the session.
//! Both the UI shells and the realtime layer consult the same mapping; in
//! particular the connection manager is never constructed for an account
//! without [`Capability::Messaging`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Features an account tier can be entitled to. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Parent/staff chat and the realtime notification layer.
    Messaging,
    /// Billing pages and payment redirects.
    Billing,
    /// Attendance tracking and reports.
    Attendance,
    /// Daily photo feed.
    PhotoFeed,
}

/// Snapshot of the capabilities enabled for the current account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlements {
    #[serde(default)]
    capabilities: BTreeSet<Capability>,
}

impl Entitlements {
    /// Snapshot with no capabilities (unauthenticated or minimal tier).
    pub fn none() -> Self {
        Entitlements::default()
    }

    /// Snapshot built from an explicit capability list.
    pub fn from_capabilities<I: IntoIterator<Item = Capability>>(caps: I) -> Self {
        Entitlements {
            capabilities: caps.into_iter().collect(),
        }
    }

    /// Returns true if the capability is enabled.
    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Number of enabled capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
