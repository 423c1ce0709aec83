//! Tests for the unread/presence reconciler: refetch-on-event,
//! direct-apply for authoritative pushes, isolation, and pull-wins
//! convergence.

use std::collections::VecDeque;

use nido_core::network::{ChatMessage, ServerEvent};
use nido_core::reconcile::{Reconciler, UnreadCountSource};
use nido_core::rest::RestError;
use nido_core::session::SessionError;

/// Scripted authoritative source: each fetch pops the next count.
#[derive(Default)]
struct ScriptedSource {
    counts: VecDeque<Result<u32, ()>>,
    fetches: usize,
}

impl ScriptedSource {
    fn with_counts<I: IntoIterator<Item = u32>>(counts: I) -> Self {
        ScriptedSource {
            counts: counts.into_iter().map(Ok).collect(),
            fetches: 0,
        }
    }

    fn push_failure(&mut self) {
        self.counts.push_back(Err(()));
    }
}

impl UnreadCountSource for ScriptedSource {
    fn fetch_unread_count(&mut self) -> Result<u32, SessionError> {
        self.fetches += 1;
        match self.counts.pop_front() {
            Some(Ok(count)) => Ok(count),
            _ => Err(SessionError::Transport(RestError::ConnectionFailed(
                "scripted failure".into(),
            ))),
        }
    }
}

fn message(id: i64, sender: i64, receiver: i64) -> ChatMessage {
    ChatMessage {
        id,
        sender_id: sender,
        receiver_id: receiver,
        content: "pickup at 4".into(),
        created_at: 1_700_000_000_000 + id as u64,
    }
}

const ME: i64 = 7;

fn reconciler() -> Reconciler {
    let mut r = Reconciler::new(30_000);
    r.start_session(ME);
    r
}

#[test]
fn test_initial_pull_then_new_message_refetches() {
    let mut source = ScriptedSource::with_counts([3, 4]);
    let mut r = reconciler();

    let changes = r.pull_now(0, &mut source);
    assert_eq!(changes.unread_count, Some(3));
    assert_eq!(r.unread_count(), 3);

    let event = ServerEvent::NewMessage {
        receiver_id: ME,
        message: message(1, 3, ME),
    };
    let changes = r.handle_event(&event, &mut source);
    assert_eq!(changes.unread_count, Some(4));
    assert_eq!(r.unread_count(), 4);
    assert_eq!(source.fetches, 2);
}

#[test]
fn test_new_message_records_counterparty_timestamp() {
    let mut source = ScriptedSource::with_counts([1]);
    let mut r = reconciler();

    let msg = message(5, 3, ME);
    let created_at = msg.created_at;
    r.handle_event(
        &ServerEvent::NewMessage {
            receiver_id: ME,
            message: msg,
        },
        &mut source,
    );

    assert_eq!(r.state().last_message_at(3), Some(created_at));
}

#[test]
fn test_messages_read_refetches_instead_of_zeroing() {
    // Another sender's unread messages remain: the server says 2, not 0.
    let mut source = ScriptedSource::with_counts([5, 2]);
    let mut r = reconciler();
    r.pull_now(0, &mut source);

    let event = ServerEvent::MessagesRead {
        sender_id: 3,
        receiver_id: ME,
    };
    let changes = r.handle_event(&event, &mut source);
    assert_eq!(changes.unread_count, Some(2));
    assert_eq!(r.unread_count(), 2);
}

#[test]
fn test_unread_count_update_applies_directly() {
    let mut source = ScriptedSource::default();
    let mut r = reconciler();

    let event = ServerEvent::UnreadCountUpdate {
        user_id: ME,
        count: 9,
    };
    let changes = r.handle_event(&event, &mut source);

    assert_eq!(changes.unread_count, Some(9));
    assert_eq!(r.unread_count(), 9);
    // Authoritative push: no refetch happened.
    assert_eq!(source.fetches, 0);
}

#[test]
fn test_events_for_other_users_are_ignored() {
    let mut source = ScriptedSource::with_counts([3]);
    let mut r = reconciler();
    r.pull_now(0, &mut source);

    let foreign = [
        ServerEvent::NewMessage {
            receiver_id: 99,
            message: message(1, ME, 99),
        },
        ServerEvent::MessagesRead {
            sender_id: ME,
            receiver_id: 99,
        },
        ServerEvent::UnreadCountUpdate {
            user_id: 99,
            count: 42,
        },
    ];
    for event in &foreign {
        let changes = r.handle_event(event, &mut source);
        assert!(changes.is_empty());
    }

    assert_eq!(r.unread_count(), 3);
    assert_eq!(source.fetches, 1); // Only the initial pull
}

#[test]
fn test_failed_refetch_keeps_previous_count() {
    let mut source = ScriptedSource::with_counts([3]);
    let mut r = reconciler();
    r.pull_now(0, &mut source);

    source.push_failure();
    let event = ServerEvent::NewMessage {
        receiver_id: ME,
        message: message(1, 3, ME),
    };
    let changes = r.handle_event(&event, &mut source);

    assert_eq!(changes.unread_count, None);
    assert_eq!(r.unread_count(), 3); // Stale but available
}

#[test]
fn test_presence_is_last_write_wins() {
    let mut source = ScriptedSource::default();
    let mut r = reconciler();

    let changes = r.handle_event(&ServerEvent::UserConnected { user_id: 3 }, &mut source);
    assert_eq!(changes.presence, vec![(3, true)]);
    assert!(r.state().is_online(3));

    // Duplicate connect: no flip, no change reported.
    let changes = r.handle_event(&ServerEvent::UserConnected { user_id: 3 }, &mut source);
    assert!(changes.presence.is_empty());

    let changes = r.handle_event(&ServerEvent::UserDisconnected { user_id: 3 }, &mut source);
    assert_eq!(changes.presence, vec![(3, false)]);
    assert!(!r.state().is_online(3));
}

#[test]
fn test_own_presence_events_are_ignored() {
    let mut source = ScriptedSource::default();
    let mut r = reconciler();

    let changes = r.handle_event(&ServerEvent::UserConnected { user_id: ME }, &mut source);
    assert!(changes.is_empty());
    assert!(!r.state().is_online(ME));
}

#[test]
fn test_unknown_counterparty_is_offline() {
    let r = reconciler();
    assert!(!r.state().is_online(12345));
}

#[test]
fn test_periodic_pull_respects_interval() {
    let mut source = ScriptedSource::with_counts([3, 5]);
    let mut r = reconciler();

    // First poll: nothing pulled yet, always due.
    let changes = r.poll_if_due(1_000, &mut source);
    assert_eq!(changes.unread_count, Some(3));

    // Within the interval: no pull.
    let changes = r.poll_if_due(1_000 + 29_999, &mut source);
    assert!(changes.is_empty());
    assert_eq!(source.fetches, 1);

    // Interval elapsed: pull wins over whatever was local.
    let changes = r.poll_if_due(1_000 + 30_000, &mut source);
    assert_eq!(changes.unread_count, Some(5));
}

#[test]
fn test_pull_wins_over_stale_push_value() {
    let mut source = ScriptedSource::with_counts([1]);
    let mut r = reconciler();

    // A push said 8...
    r.handle_event(
        &ServerEvent::UnreadCountUpdate {
            user_id: ME,
            count: 8,
        },
        &mut source,
    );
    assert_eq!(r.unread_count(), 8);

    // ...but the authoritative pull replaces it wholesale.
    r.pull_now(60_000, &mut source);
    assert_eq!(r.unread_count(), 1);
}

#[test]
fn test_events_with_no_session_do_nothing() {
    let mut source = ScriptedSource::with_counts([3]);
    let mut r = Reconciler::new(30_000);

    let changes = r.handle_event(
        &ServerEvent::UnreadCountUpdate {
            user_id: ME,
            count: 4,
        },
        &mut source,
    );
    assert!(changes.is_empty());
    assert!(r.poll_if_due(0, &mut source).is_empty());
    assert_eq!(source.fetches, 0);
}

#[test]
fn test_clear_resets_everything() {
    let mut source = ScriptedSource::with_counts([6]);
    let mut r = reconciler();
    r.pull_now(0, &mut source);
    r.handle_event(&ServerEvent::UserConnected { user_id: 3 }, &mut source);

    r.clear();
    assert_eq!(r.unread_count(), 0);
    assert!(!r.state().is_online(3));
    assert_eq!(r.current_user(), None);
}

mod convergence {
    use super::*;
    use proptest::prelude::*;

    /// Any interleaving of count-affecting events converges to the value
    /// of the last-resolved authoritative pull.
    fn arbitrary_event(count: u32, foreign: bool) -> ServerEvent {
        let user = if foreign { 99 } else { ME };
        match count % 3 {
            0 => ServerEvent::NewMessage {
                receiver_id: user,
                message: message(count as i64, 3, user),
            },
            1 => ServerEvent::MessagesRead {
                sender_id: 3,
                receiver_id: user,
            },
            _ => ServerEvent::UnreadCountUpdate {
                user_id: user,
                count,
            },
        }
    }

    proptest! {
        #[test]
        fn final_count_equals_last_pull(
            seeds in prop::collection::vec((0u32..100, any::<bool>()), 0..32),
            fetched in prop::collection::vec(0u32..100, 0..40),
            last_pull in 0u32..100,
        ) {
            let mut source = ScriptedSource::with_counts(fetched);
            let mut r = reconciler();

            for (seed, foreign) in seeds {
                let _ = r.handle_event(&arbitrary_event(seed, foreign), &mut source);
            }

            // The closing authoritative pull replaces local state wholesale,
            // regardless of what the event history left behind.
            let mut closing = ScriptedSource::with_counts([last_pull]);
            r.pull_now(u64::MAX / 2, &mut closing);
            prop_assert_eq!(r.unread_count(), last_pull);
        }

        #[test]
        fn foreign_events_never_mutate_state(
            seeds in prop::collection::vec(0u32..100, 0..32),
        ) {
            let mut source = ScriptedSource::default();
            let mut r = reconciler();
            r.handle_event(
                &ServerEvent::UnreadCountUpdate { user_id: ME, count: 17 },
                &mut source,
            );

            for seed in seeds {
                let changes = r.handle_event(&arbitrary_event(seed, true), &mut source);
                prop_assert!(changes.is_empty());
            }
            prop_assert_eq!(r.unread_count(), 17);
            prop_assert_eq!(source.fetches, 0);
        }
    }
}
