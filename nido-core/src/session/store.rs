// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Session Store
//!
//! Single source of truth for "who is logged in". The session survives
//! process restarts through the [`SessionCache`] and is destroyed on
//! logout, on any authorization failure, and on token absence during an
//! authenticated call. All other components receive read-only views.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::rest::{ApiRequest, Method, RestTransport};
use crate::storage::{SessionCache, StorageError};

use super::entitlements::{Capability, Entitlements};
use super::error::{SessionError, SessionResult};
use super::role::Role;
use super::token::AuthToken;

/// Server-assigned numeric user id.
pub type UserId = i64;

/// Authenticated user profile, as issued by the backend at login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub role: Role,
    pub display_name: String,
    /// Daycare affiliation.
    pub daycare_id: i64,
}

/// The authenticated identity: user, credential, entitlement snapshot.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub token: AuthToken,
    pub entitlements: Entitlements,
}

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: AuthToken,
    user: UserProfile,
    #[serde(default)]
    entitlements: Entitlements,
}

#[derive(Debug, Deserialize)]
struct UnreadCountResponse {
    count: u32,
}

/// Owns the session and the guarded request wrapper.
pub struct SessionStore<R: RestTransport> {
    rest: R,
    cache: SessionCache,
    session: Option<Session>,
}

impl<R: RestTransport> SessionStore<R> {
    /// Creates a store over a REST transport and a session cache.
    pub fn new(rest: R, cache: SessionCache) -> Self {
        SessionStore {
            rest,
            cache,
            session: None,
        }
    }

    /// Returns a reference to the underlying REST transport.
    pub fn rest(&self) -> &R {
        &self.rest
    }

    // === Lifecycle ===

    /// Restores a persisted session, if one exists. Never touches the network.
    ///
    /// Invoked once at startup. A persisted record that no longer
    /// deserializes is cleared and treated as absent: one forced re-login
    /// instead of a version-negotiation protocol.
    pub fn restore_session(&mut self) -> SessionResult<Option<&Session>> {
        match self.cache.load_session() {
            Ok(Some(session)) => {
                info!(user_id = session.user.id, "session restored from cache");
                Ok(Some(self.session.insert(session)))
            }
            Ok(None) => Ok(None),
            Err(StorageError::Serialization(e)) => {
                warn!(error = %e, "persisted session unreadable, clearing");
                if let Err(e) = self.cache.clear_session() {
                    warn!(error = %e, "failed to clear unreadable session");
                }
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticates against the backend and persists the session.
    ///
    /// On a non-2xx response the server-provided message is surfaced via
    /// [`SessionError::Auth`]; nothing is retried and no state changes.
    pub fn login(&mut self, email: &str, password: &str) -> SessionResult<&Session> {
        let request = ApiRequest::new(Method::Post, "/auth/login")
            .with_body(json!({ "email": email, "password": password }));
        let response = self.rest.execute(&request)?;

        if !response.is_success() {
            warn!(status = response.status, "login rejected");
            let message = response.message().unwrap_or("invalid credentials");
            return Err(SessionError::Auth(message.to_string()));
        }

        let login: LoginResponse = serde_json::from_value(response.body)
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;

        let session = Session {
            user: login.user,
            token: login.token,
            entitlements: login.entitlements,
        };
        self.cache.save_session(&session)?;
        info!(user_id = session.user.id, "logged in");

        Ok(self.session.insert(session))
    }

    /// Clears in-memory and persisted session state unconditionally.
    ///
    /// Cache failures are logged, never propagated: logout must always
    /// leave the process unauthenticated.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(user_id = session.user.id, "session cleared");
        }
        if let Err(e) = self.cache.clear_session() {
            warn!(error = %e, "failed to clear persisted session");
        }
    }

    // === Read surface ===

    /// The current session, if authenticated.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// The current bearer token, if authenticated.
    pub fn token(&self) -> Option<&AuthToken> {
        self.session.as_ref().map(|s| &s.token)
    }

    /// Whether the current account is entitled to a capability.
    /// Unauthenticated sessions are entitled to nothing.
    pub fn allows(&self, capability: Capability) -> bool {
        self.session
            .as_ref()
            .map(|s| s.entitlements.allows(capability))
            .unwrap_or(false)
    }

    // === Guarded requests ===

    /// Executes an authenticated request against the backend.
    ///
    /// Fails fast with [`SessionError::NoToken`] before any network I/O
    /// when unauthenticated, and treats a 401 as [`SessionError::SessionExpired`];
    /// both tear the session down before returning. Other non-2xx responses
    /// surface the server message and leave the session intact.
    pub fn authenticated_request<T: DeserializeOwned>(
        &mut self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> SessionResult<T> {
        let token = match &self.session {
            Some(session) => session.token.as_str().to_string(),
            None => {
                warn!(path, "authenticated request without a session");
                self.logout();
                return Err(SessionError::NoToken);
            }
        };

        let mut request = ApiRequest::new(method, path).with_bearer(&token);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        let response = self.rest.execute(&request)?;

        if response.status == 401 {
            warn!(path, "token rejected by server, ending session");
            self.logout();
            return Err(SessionError::SessionExpired);
        }
        if !response.is_success() {
            let message = response.message().unwrap_or("request failed").to_string();
            return Err(SessionError::Request {
                status: response.status,
                message,
            });
        }

        serde_json::from_value(response.body)
            .map_err(|e| SessionError::MalformedResponse(e.to_string()))
    }

    /// Fetches the authoritative unread message count.
    pub fn unread_count(&mut self) -> SessionResult<u32> {
        let response: UnreadCountResponse =
            self.authenticated_request(Method::Get, "/chat/unread-count", None)?;
        Ok(response.count)
    }
}
