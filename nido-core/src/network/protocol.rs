// SPDX-FileCopyrightText: 2026 Nido Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire Protocol
//!
//! Frames on the realtime channel are JSON text of the shape
//! `{"event": "<name>", "data": {...}}` with camelCase payload fields.
//! Unknown event names decode to `None` so newer servers can add events
//! without breaking older clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{NetworkError, NetworkResult};
use super::event::{ChatMessage, ClientEvent, ServerEvent};
use crate::session::UserId;

/// Maximum accepted frame size in bytes.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

#[derive(Serialize, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoomPayload {
    user_id: UserId,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewMessagePayload {
    receiver_id: UserId,
    message: ChatMessage,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagesReadPayload {
    sender_id: UserId,
    receiver_id: UserId,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnreadCountPayload {
    user_id: UserId,
    count: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresencePayload {
    user_id: UserId,
}

/// Encodes a client event into a wire frame.
pub fn encode_client_event(event: &ClientEvent) -> NetworkResult<String> {
    let data = match *event {
        ClientEvent::JoinRoom { user_id } | ClientEvent::LeaveRoom { user_id } => {
            serde_json::to_value(RoomPayload { user_id })
        }
    }
    .map_err(|e| NetworkError::InvalidFrame(e.to_string()))?;

    let frame = RawFrame {
        event: event.name().to_string(),
        data,
    };
    serde_json::to_string(&frame).map_err(|e| NetworkError::InvalidFrame(e.to_string()))
}

/// Decodes a wire frame into a server event.
///
/// Returns `Ok(None)` for event names this core does not know. A known
/// event with a malformed payload is an error: that is a contract break,
/// not forward compatibility.
pub fn decode_server_event(text: &str) -> NetworkResult<Option<ServerEvent>> {
    if text.len() > MAX_FRAME_SIZE {
        return Err(NetworkError::FrameTooLarge {
            size: text.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let frame: RawFrame =
        serde_json::from_str(text).map_err(|e| NetworkError::InvalidFrame(e.to_string()))?;

    let event = match frame.event.as_str() {
        "new_message" => {
            let p: NewMessagePayload = parse_payload(frame.data)?;
            ServerEvent::NewMessage {
                receiver_id: p.receiver_id,
                message: p.message,
            }
        }
        "messages_read" => {
            let p: MessagesReadPayload = parse_payload(frame.data)?;
            ServerEvent::MessagesRead {
                sender_id: p.sender_id,
                receiver_id: p.receiver_id,
            }
        }
        "unread_count_update" => {
            let p: UnreadCountPayload = parse_payload(frame.data)?;
            ServerEvent::UnreadCountUpdate {
                user_id: p.user_id,
                count: p.count,
            }
        }
        "user_connected" => {
            let p: PresencePayload = parse_payload(frame.data)?;
            ServerEvent::UserConnected { user_id: p.user_id }
        }
        "user_disconnected" => {
            let p: PresencePayload = parse_payload(frame.data)?;
            ServerEvent::UserDisconnected { user_id: p.user_id }
        }
        _ => return Ok(None),
    };

    Ok(Some(event))
}

/// Encodes a server event into a wire frame. Used by mocks and tests; the
/// production server is the usual producer.
pub fn encode_server_event(event: &ServerEvent) -> NetworkResult<String> {
    let data = match event {
        ServerEvent::NewMessage {
            receiver_id,
            message,
        } => serde_json::to_value(NewMessagePayload {
            receiver_id: *receiver_id,
            message: message.clone(),
        }),
        ServerEvent::MessagesRead {
            sender_id,
            receiver_id,
        } => serde_json::to_value(MessagesReadPayload {
            sender_id: *sender_id,
            receiver_id: *receiver_id,
        }),
        ServerEvent::UnreadCountUpdate { user_id, count } => {
            serde_json::to_value(UnreadCountPayload {
                user_id: *user_id,
                count: *count,
            })
        }
        ServerEvent::UserConnected { user_id } | ServerEvent::UserDisconnected { user_id } => {
            serde_json::to_value(PresencePayload { user_id: *user_id })
        }
    }
    .map_err(|e| NetworkError::InvalidFrame(e.to_string()))?;

    let frame = RawFrame {
        event: event.name().to_string(),
        data,
    };
    serde_json::to_string(&frame).map_err(|e| NetworkError::InvalidFrame(e.to_string()))
}

fn parse_payload<T: serde::de::DeserializeOwned>(data: Value) -> NetworkResult<T> {
    serde_json::from_value(data).map_err(|e| NetworkError::InvalidFrame(e.to_string()))
}
