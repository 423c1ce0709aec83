// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types.

use std::path::PathBuf;

use crate::network::RealtimeConfig;
use crate::rest::RestConfig;

/// Configuration for the Nido core.
#[derive(Debug, Clone)]
pub struct NidoConfig {
    /// Path to the session cache database.
    pub storage_path: PathBuf,
    /// Backend REST API configuration.
    pub rest: RestConfig,
    /// Realtime connection configuration.
    pub realtime: RealtimeConfig,
    /// Interval of the periodic authoritative unread pull (milliseconds).
    /// The interval is a correctness backstop against missed push events,
    /// independent of push activity.
    pub unread_poll_interval_ms: u64,
}

impl Default for NidoConfig {
    fn default() -> Self {
        NidoConfig {
            storage_path: PathBuf::from("nido-session.db"),
            rest: RestConfig::default(),
            realtime: RealtimeConfig::default(),
            unread_poll_interval_ms: 30_000,
        }
    }
}

impl NidoConfig {
    /// Config pointing at a backend and realtime server pair.
    pub fn with_servers(api_url: &str, realtime_url: &str) -> Self {
        NidoConfig {
            rest: RestConfig {
                base_url: api_url.to_string(),
                ..RestConfig::default()
            },
            realtime: RealtimeConfig {
                server_url: realtime_url.to_string(),
                ..RealtimeConfig::default()
            },
            ..Self::default()
        }
    }
}
