// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Realtime Event Types
//!
//! Wire event types for the realtime channel. The client only ever sends
//! room membership events; everything count- or presence-related flows
//! server→client.

use serde::{Deserialize, Serialize};

use crate::session::UserId;

/// A chat message as carried inside `new_message` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    /// Unix timestamp in milliseconds.
    pub created_at: u64,
}

/// Events the client sends to the server.
///
/// The set is closed on purpose: room membership is the only client→server
/// traffic this core owns. Sending chat messages belongs to the chat UI,
/// which goes through the REST API.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Subscribe this connection to the user's private event room.
    JoinRoom { user_id: UserId },
    /// Unsubscribe before teardown.
    LeaveRoom { user_id: UserId },
}

impl ClientEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom { .. } => "join_room",
            ClientEvent::LeaveRoom { .. } => "leave_room",
        }
    }
}

/// Events pushed by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// A message was created. Triggers reconciliation when `receiver_id`
    /// matches the current user.
    NewMessage {
        receiver_id: UserId,
        message: ChatMessage,
    },
    /// Read-receipt: the receiver has read the sender's messages.
    MessagesRead {
        sender_id: UserId,
        receiver_id: UserId,
    },
    /// Authoritative server-computed count, applied directly.
    UnreadCountUpdate { user_id: UserId, count: u32 },
    /// A counterparty came online.
    UserConnected { user_id: UserId },
    /// A counterparty went offline.
    UserDisconnected { user_id: UserId },
}

impl ServerEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            ServerEvent::NewMessage { .. } => "new_message",
            ServerEvent::MessagesRead { .. } => "messages_read",
            ServerEvent::UnreadCountUpdate { .. } => "unread_count_update",
            ServerEvent::UserConnected { .. } => "user_connected",
            ServerEvent::UserDisconnected { .. } => "user_disconnected",
        }
    }
}
