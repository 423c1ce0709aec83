//! Tests for the session cache slots.

use nido_core::session::{AuthToken, Capability, Entitlements, Role, Session, UserProfile};
use nido_core::storage::{SessionCache, StorageError};

fn sample_session() -> Session {
    Session {
        user: UserProfile {
            id: 7,
            role: Role::Parent,
            display_name: "Pat Example".into(),
            daycare_id: 3,
        },
        token: AuthToken::new("tok-abc"),
        entitlements: Entitlements::from_capabilities([Capability::Messaging]),
    }
}

#[test]
fn test_fresh_cache_has_no_session() {
    let cache = SessionCache::in_memory().unwrap();
    assert!(cache.load_session().unwrap().is_none());
    assert!(!cache.has_session().unwrap());
}

#[test]
fn test_save_then_load() {
    let cache = SessionCache::in_memory().unwrap();
    cache.save_session(&sample_session()).unwrap();

    let loaded = cache.load_session().unwrap().unwrap();
    assert_eq!(loaded.user.id, 7);
    assert_eq!(loaded.user.role, Role::Parent);
    assert_eq!(loaded.token.as_str(), "tok-abc");
    assert!(loaded.entitlements.allows(Capability::Messaging));
}

#[test]
fn test_clear_session_removes_all_slots() {
    let cache = SessionCache::in_memory().unwrap();
    cache.save_session(&sample_session()).unwrap();
    cache.clear_session().unwrap();

    assert!(cache.load_session().unwrap().is_none());
    assert!(!cache.has_session().unwrap());
}

#[test]
fn test_clear_on_empty_cache_is_ok() {
    let cache = SessionCache::in_memory().unwrap();
    cache.clear_session().unwrap();
}

#[test]
fn test_session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.db");

    {
        let cache = SessionCache::open(&path).unwrap();
        cache.save_session(&sample_session()).unwrap();
    }

    let cache = SessionCache::open(&path).unwrap();
    let loaded = cache.load_session().unwrap().unwrap();
    assert_eq!(loaded.user.display_name, "Pat Example");
}

#[test]
fn test_save_overwrites_previous_session() {
    let cache = SessionCache::in_memory().unwrap();
    cache.save_session(&sample_session()).unwrap();

    let mut second = sample_session();
    second.user.id = 8;
    second.token = AuthToken::new("tok-def");
    cache.save_session(&second).unwrap();

    let loaded = cache.load_session().unwrap().unwrap();
    assert_eq!(loaded.user.id, 8);
    assert_eq!(loaded.token.as_str(), "tok-def");
}

#[test]
fn test_corrupt_slot_is_a_serialization_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.db");

    {
        let cache = SessionCache::open(&path).unwrap();
        cache.save_session(&sample_session()).unwrap();
    }

    // Corrupt the user record behind the cache's back.
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE session_slots SET value = '{not json' WHERE slot = 'user'",
        [],
    )
    .unwrap();
    drop(conn);

    let cache = SessionCache::open(&path).unwrap();
    let result = cache.load_session();
    assert!(matches!(result, Err(StorageError::Serialization(_))));
}

#[test]
fn test_schema_version_is_current() {
    let cache = SessionCache::in_memory().unwrap();
    assert_eq!(cache.schema_version().unwrap(), 1);
}
