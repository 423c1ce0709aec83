// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bearer token newtype.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque bearer credential.
///
/// The core never inspects the token; it is attached to authenticated HTTP
/// calls and to the realtime handshake, and wiped from memory when dropped.
/// Presence of a token is what "authenticated" means.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        AuthToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Redacted: tokens must not leak into logs through Debug formatting.
impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(..)")
    }
}
