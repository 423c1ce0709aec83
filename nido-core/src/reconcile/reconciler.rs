// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Unread/Presence Reconciler
//!
//! Resolves push events and authoritative pulls into one consistent
//! notification state. The push transport is best-effort, so count-changing
//! events never adjust the local counter directly: they trigger a fresh
//! authoritative pull and the response replaces local state wholesale.
//! Only `unread_count_update` carries a server-computed value and is
//! applied as-is. A periodic pull backstops missed pushes; pull wins ties.

use tracing::{debug, warn};

use crate::network::ServerEvent;
use crate::rest::RestTransport;
use crate::session::{SessionError, SessionStore, UserId};

use super::state::NotificationState;

/// Source of the authoritative unread count.
///
/// Implemented by the session store (`GET /chat/unread-count` behind the
/// guarded request wrapper); tests substitute scripted counts.
pub trait UnreadCountSource {
    fn fetch_unread_count(&mut self) -> Result<u32, SessionError>;
}

impl<R: RestTransport> UnreadCountSource for SessionStore<R> {
    fn fetch_unread_count(&mut self) -> Result<u32, SessionError> {
        self.unread_count()
    }
}

/// What a reconciliation pass changed, for event emission by the caller.
#[derive(Debug, Default, PartialEq)]
pub struct ReconcileChanges {
    /// New unread count, when it changed.
    pub unread_count: Option<u32>,
    /// Presence flips applied, in order.
    pub presence: Vec<(UserId, bool)>,
}

impl ReconcileChanges {
    pub fn is_empty(&self) -> bool {
        self.unread_count.is_none() && self.presence.is_empty()
    }
}

/// Maintains the authoritative unread count and presence map.
pub struct Reconciler {
    /// The session user events must be scoped to. No user, no mutations.
    user_id: Option<UserId>,
    state: NotificationState,
    poll_interval_ms: u64,
    last_pull_at_ms: Option<u64>,
}

impl Reconciler {
    /// Creates a reconciler with the given backstop pull interval.
    pub fn new(poll_interval_ms: u64) -> Self {
        Reconciler {
            user_id: None,
            state: NotificationState::default(),
            poll_interval_ms,
            last_pull_at_ms: None,
        }
    }

    /// Begins reconciling for a user, from the zero/unknown state.
    pub fn start_session(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
        self.state.reset();
        self.last_pull_at_ms = None;
    }

    /// Clears all state on logout.
    pub fn clear(&mut self) {
        self.user_id = None;
        self.state.reset();
        self.last_pull_at_ms = None;
    }

    /// The user currently being reconciled for.
    pub fn current_user(&self) -> Option<UserId> {
        self.user_id
    }

    /// Read access to the reconciled state.
    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    /// Current unread count.
    pub fn unread_count(&self) -> u32 {
        self.state.unread_count()
    }

    /// Applies one server event.
    ///
    /// Events scoped to a different user never mutate state: the transport
    /// is shared, and a misrouted event must not leak across tenants.
    pub fn handle_event(
        &mut self,
        event: &ServerEvent,
        source: &mut dyn UnreadCountSource,
    ) -> ReconcileChanges {
        let mut changes = ReconcileChanges::default();
        let me = match self.user_id {
            Some(id) => id,
            None => return changes,
        };

        match event {
            ServerEvent::NewMessage {
                receiver_id,
                message,
            } if *receiver_id == me => {
                self.state
                    .record_message(message.sender_id, message.created_at);
                changes.unread_count = self.refetch(source);
            }
            ServerEvent::MessagesRead { receiver_id, .. } if *receiver_id == me => {
                // Never assume zero: other senders' unread messages may remain.
                changes.unread_count = self.refetch(source);
            }
            ServerEvent::UnreadCountUpdate { user_id, count } if *user_id == me => {
                // Server-computed value: applied directly, no refetch.
                if self.state.set_unread_count(*count) {
                    changes.unread_count = Some(*count);
                }
            }
            ServerEvent::UserConnected { user_id } if *user_id != me => {
                if self.state.set_presence(*user_id, true) {
                    changes.presence.push((*user_id, true));
                }
            }
            ServerEvent::UserDisconnected { user_id } if *user_id != me => {
                if self.state.set_presence(*user_id, false) {
                    changes.presence.push((*user_id, false));
                }
            }
            other => {
                debug!(event = other.name(), "event not scoped to this user, ignored");
            }
        }

        changes
    }

    /// Runs the periodic backstop pull when its interval has elapsed.
    ///
    /// The interval is independent of push activity: event-triggered
    /// refetches do not reset it.
    pub fn poll_if_due(
        &mut self,
        now_ms: u64,
        source: &mut dyn UnreadCountSource,
    ) -> ReconcileChanges {
        if self.user_id.is_none() {
            return ReconcileChanges::default();
        }

        let due = match self.last_pull_at_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.poll_interval_ms,
        };
        if !due {
            return ReconcileChanges::default();
        }

        self.pull_now(now_ms, source)
    }

    /// Forces an authoritative pull immediately and stamps the interval.
    pub fn pull_now(
        &mut self,
        now_ms: u64,
        source: &mut dyn UnreadCountSource,
    ) -> ReconcileChanges {
        let mut changes = ReconcileChanges::default();
        if self.user_id.is_none() {
            return changes;
        }

        self.last_pull_at_ms = Some(now_ms);
        changes.unread_count = self.refetch(source);
        changes
    }

    /// Fetches the authoritative count and replaces local state with it.
    ///
    /// A failed fetch keeps the previous count: stale-but-available beats
    /// failing the caller.
    fn refetch(&mut self, source: &mut dyn UnreadCountSource) -> Option<u32> {
        match source.fetch_unread_count() {
            Ok(count) => self.state.set_unread_count(count).then_some(count),
            Err(e) => {
                warn!(error = %e, "unread refetch failed, keeping previous count");
                None
            }
        }
    }
}
