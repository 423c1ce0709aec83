// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Notification state.

use std::collections::HashMap;

use crate::session::UserId;

/// The single source of truth for unread count and counterparty presence.
///
/// Only the reconciler mutates this; everything else reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    unread_count: u32,
    presence: HashMap<UserId, bool>,
    last_message_at: HashMap<UserId, u64>,
}

impl NotificationState {
    /// Current unread message count.
    pub fn unread_count(&self) -> u32 {
        self.unread_count
    }

    /// Whether a counterparty is currently online. Unknown users are offline.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.presence.get(&user_id).copied().unwrap_or(false)
    }

    /// Online/offline flags per counterparty.
    pub fn presence(&self) -> &HashMap<UserId, bool> {
        &self.presence
    }

    /// Timestamp (unix ms) of the last message received from a counterparty.
    pub fn last_message_at(&self, user_id: UserId) -> Option<u64> {
        self.last_message_at.get(&user_id).copied()
    }

    /// Replaces the count. Returns true if the value changed.
    pub(crate) fn set_unread_count(&mut self, count: u32) -> bool {
        if self.unread_count == count {
            return false;
        }
        self.unread_count = count;
        true
    }

    /// Records a presence flag. Returns true if the flag flipped.
    pub(crate) fn set_presence(&mut self, user_id: UserId, online: bool) -> bool {
        self.presence.insert(user_id, online) != Some(online)
    }

    /// Records the last-message timestamp for a counterparty.
    pub(crate) fn record_message(&mut self, sender_id: UserId, created_at: u64) {
        self.last_message_at.insert(sender_id, created_at);
    }

    /// Resets everything to the initial zero/unknown state.
    pub(crate) fn reset(&mut self) {
        self.unread_count = 0;
        self.presence.clear();
        self.last_message_at.clear();
    }
}
