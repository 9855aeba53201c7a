//! Core protocol types for Studiolink's wire format.
//!
//! Every type here gets serialized to JSON, sent over the persistent
//! connection, and deserialized on the other side. Field names follow the
//! client convention (camelCase, with `photoURL` as a historical special
//! case); event tags are snake_case strings under an `"event"` tag with
//! the payload under `"data"`, mirroring the (event, payload) pairs the
//! desktop client emits.

use serde::{Deserialize, Serialize};

use std::fmt;

use studiolink_transport::ConnectionId;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a session (a shared studio workspace).
///
/// Opaque string assigned at session creation, outside the coordinator.
/// The registry accepts any identifier and creates rooms lazily, so this
/// carries no validity guarantee beyond being non-empty at the source.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A unique identifier for a user, as issued by the identity provider.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Identity and membership
// ---------------------------------------------------------------------------

/// A user's public identity as seen by other session members.
///
/// This is what the gate attaches to an authenticated connection and what
/// travels in `user_joined` / `user_left` notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// The user's identifier.
    pub user_id: UserId,
    /// Human-readable display name.
    pub display_name: String,
    /// Avatar reference, if the user has one.
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// One connection's record of being present in a room.
///
/// Ephemeral: created on `join_session`, removed on `leave_session` or
/// connection loss, never persisted. A user holding two devices gets two
/// entries, distinguished by `connection_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// The user this entry belongs to.
    pub user_id: UserId,
    /// Display name at the time of joining.
    pub display_name: String,
    /// Avatar reference, if any.
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    /// The connection that owns this entry.
    pub connection_id: ConnectionId,
}

impl Member {
    /// Returns the member's public identity (without the connection id).
    pub fn info(&self) -> UserInfo {
        UserInfo {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// The kind of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A plain text message typed by a user.
    #[default]
    Text,
    /// A file reference shared into the chat.
    File,
    /// A system-generated notice.
    System,
}

/// A chat message, broadcast-only — the coordinator never persists these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Monotonically-distinguishing token derived from the send time.
    pub id: String,
    /// The session the message belongs to.
    pub session_id: SessionId,
    /// The author's user id.
    pub user_id: UserId,
    /// The author's display name.
    pub user_name: String,
    /// The author's avatar reference, if any.
    pub user_avatar: Option<String>,
    /// The message body.
    pub message: String,
    /// Unix milliseconds at the time the router built the message.
    pub timestamp: u64,
    /// Message kind. Serialized under the historical wire name `type`.
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// The first frame a client sends: its claimed identity.
///
/// Which fields matter depends on the gate mode: verified mode consumes
/// `idToken`; trusted mode consumes `userId` (plus the optional
/// passthroughs). Everything is optional at the wire level — the gate
/// decides what is required.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    /// Bearer token for the external identity provider (verified mode).
    pub id_token: Option<String>,
    /// Claimed user id (trusted mode).
    pub user_id: Option<String>,
    /// Claimed display name (trusted mode, optional passthrough).
    pub display_name: Option<String>,
    /// Claimed avatar reference (trusted mode, optional passthrough).
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Client → server events
// ---------------------------------------------------------------------------

/// Events a client sends after authentication.
///
/// `#[serde(tag = "event", content = "data")]` produces adjacently tagged
/// JSON, e.g.:
///   `{ "event": "join_session", "data": { "sessionId": "s1" } }`
/// A frame whose `event` tag is unknown, or whose `data` is missing
/// required fields, fails to decode — the connection handler drops it
/// silently rather than crashing the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// "Add me to this session's room."
    #[serde(rename_all = "camelCase")]
    JoinSession { session_id: SessionId },

    /// "Remove me from this session's room."
    #[serde(rename_all = "camelCase")]
    LeaveSession { session_id: SessionId },

    /// "Deliver this chat message to the room."
    #[serde(rename_all = "camelCase")]
    SendMessage {
        session_id: SessionId,
        message: String,
    },

    /// "Tell the room I updated a file." The sender already knows, so
    /// the router broadcasts to everyone *except* them.
    #[serde(rename_all = "camelCase")]
    FileUpdated {
        session_id: SessionId,
        file_name: String,
        file_url: String,
    },
}

impl ClientEvent {
    /// Returns the session this event targets.
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::JoinSession { session_id }
            | Self::LeaveSession { session_id }
            | Self::SendMessage { session_id, .. }
            | Self::FileUpdated { session_id, .. } => session_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client events
// ---------------------------------------------------------------------------

/// Events the coordinator sends to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full roster snapshot for a room, sent to every member (including
    /// whoever triggered the change).
    #[serde(rename_all = "camelCase")]
    SessionUsersUpdated {
        session_id: SessionId,
        users: Vec<Member>,
    },

    /// A member joined; sent to every *other* member of the room.
    #[serde(rename_all = "camelCase")]
    UserJoined {
        session_id: SessionId,
        user: UserInfo,
    },

    /// A member left (or disconnected); sent to the remaining members.
    #[serde(rename_all = "camelCase")]
    UserLeft {
        session_id: SessionId,
        user: UserInfo,
    },

    /// A chat message, delivered to the whole room including the sender
    /// (the sender's UI syncs through the same channel, no local echo).
    NewMessage(ChatMessage),

    /// A file changed; delivered to everyone except whoever changed it.
    #[serde(rename_all = "camelCase")]
    FileUpdated {
        session_id: SessionId,
        file_name: String,
        file_url: String,
        updated_by: UserInfo,
    },

    /// The connection's standard error channel. The only error the
    /// coordinator currently emits here is the opaque authentication
    /// rejection.
    #[serde(rename_all = "camelCase")]
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
