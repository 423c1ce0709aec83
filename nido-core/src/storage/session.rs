// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session slot operations.
//!
//! The persisted session is three records under fixed named slots. Records
//! are opaque serialized JSON: the cache does not inspect or version them.

use rusqlite::params;

use super::{SessionCache, StorageError};
use crate::session::{AuthToken, Entitlements, Session, UserProfile};

/// Slot holding the bearer token.
pub const SLOT_TOKEN: &str = "token";
/// Slot holding the user profile.
pub const SLOT_USER: &str = "user";
/// Slot holding the entitlement snapshot.
pub const SLOT_ENTITLEMENTS: &str = "entitlements";

impl SessionCache {
    // === Session Operations ===

    /// Persists the session under the fixed slots.
    pub fn save_session(&self, session: &Session) -> Result<(), StorageError> {
        let token = serde_json::to_string(&session.token)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let user = serde_json::to_string(&session.user)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let entitlements = serde_json::to_string(&session.entitlements)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.put_slot(SLOT_TOKEN, &token)?;
        self.put_slot(SLOT_USER, &user)?;
        self.put_slot(SLOT_ENTITLEMENTS, &entitlements)?;
        Ok(())
    }

    /// Loads the persisted session, if all slots are present.
    ///
    /// Returns `Ok(None)` when no session was persisted. A record that no
    /// longer deserializes is reported as a serialization error; callers
    /// decide whether to clear and fall back to unauthenticated.
    pub fn load_session(&self) -> Result<Option<Session>, StorageError> {
        let (token, user, entitlements) = match (
            self.get_slot(SLOT_TOKEN)?,
            self.get_slot(SLOT_USER)?,
            self.get_slot(SLOT_ENTITLEMENTS)?,
        ) {
            (Some(t), Some(u), Some(e)) => (t, u, e),
            _ => return Ok(None),
        };

        let token: AuthToken = serde_json::from_str(&token)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let user: UserProfile = serde_json::from_str(&user)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let entitlements: Entitlements = serde_json::from_str(&entitlements)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        Ok(Some(Session {
            user,
            token,
            entitlements,
        }))
    }

    /// Removes every session slot. Safe to call when nothing is persisted.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.conn().execute(
            "DELETE FROM session_slots WHERE slot IN (?1, ?2, ?3)",
            params![SLOT_TOKEN, SLOT_USER, SLOT_ENTITLEMENTS],
        )?;
        Ok(())
    }

    /// Returns true if a token slot is present.
    pub fn has_session(&self) -> Result<bool, StorageError> {
        Ok(self.get_slot(SLOT_TOKEN)?.is_some())
    }

    fn put_slot(&self, slot: &str, value: &str) -> Result<(), StorageError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.conn().execute(
            "INSERT OR REPLACE INTO session_slots (slot, value, updated_at) VALUES (?1, ?2, ?3)",
            params![slot, value, now as i64],
        )?;
        Ok(())
    }

    fn get_slot(&self, slot: &str) -> Result<Option<String>, StorageError> {
        let result = self.conn().query_row(
            "SELECT value FROM session_slots WHERE slot = ?1",
            params![slot],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Database(e)),
        }
    }
}
