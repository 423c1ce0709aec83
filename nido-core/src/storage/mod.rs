// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persistent Session Cache
//!
//! Local storage for the authenticated session so a process restart does
//! not force re-login. Uses SQLite with a small fixed-slot table: each
//! persisted record (token, user profile, entitlement snapshot) is written
//! as an opaque serialized value under a named slot and read back verbatim
//! at startup.

#[cfg(feature = "testing")]
pub mod error;
#[cfg(not(feature = "testing"))]
mod error;

#[cfg(feature = "testing")]
pub mod session;
#[cfg(not(feature = "testing"))]
mod session;

pub mod migration;

pub use error::StorageError;
pub use session::{SLOT_ENTITLEMENTS, SLOT_TOKEN, SLOT_USER};

use rusqlite::Connection;
use std::path::Path;

/// SQLite-based session cache.
///
/// Holds the durable copy of the session record slots. All other state in
/// the core is in-memory and rebuilt from the server after restore.
pub struct SessionCache {
    conn: Connection,
}

impl SessionCache {
    /// Opens or creates a session cache database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let cache = SessionCache { conn };
        cache.run_migrations()?;
        Ok(cache)
    }

    /// Creates an in-memory session cache (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let cache = SessionCache { conn };
        cache.run_migrations()?;
        Ok(cache)
    }

    /// Runs all pending schema migrations.
    fn run_migrations(&self) -> Result<(), StorageError> {
        let migrations = migration::all_migrations();
        migration::MigrationRunner::run(&self.conn, &migrations)
    }

    /// Returns the current schema version.
    pub fn schema_version(&self) -> Result<u32, StorageError> {
        migration::MigrationRunner::current_version(&self.conn)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
