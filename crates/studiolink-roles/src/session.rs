//! Durable session metadata.
//!
//! This is the record the metadata store keeps per session. The
//! coordinator never writes it; it only reads roles out of it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use studiolink_protocol::{SessionId, UserId};

use crate::Role;

/// Lifecycle state of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Open for collaboration.
    #[default]
    Active,
    /// Ended or archived.
    Inactive,
    /// Studio environment is being provisioned.
    Launching,
}

/// Per-session feature switches, chosen by the owner at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    /// Hard cap on simultaneous participants.
    pub max_participants: u32,
    /// Whether editors may upload files.
    pub allow_file_upload: bool,
    /// Whether the session chat is enabled.
    pub allow_chat: bool,
    /// Whether studio state is saved automatically.
    pub auto_save: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_participants: 10,
            allow_file_upload: true,
            allow_chat: true,
            auto_save: true,
        }
    }
}

/// A session's durable metadata record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    /// The session's identifier.
    pub id: SessionId,
    /// Human-readable session name.
    pub name: String,
    /// The user who created the session.
    pub created_by: UserId,
    /// Lifecycle state.
    #[serde(default)]
    pub status: SessionStatus,
    /// Feature switches.
    #[serde(default)]
    pub settings: SessionSettings,
    /// Explicit role assignments. The creator is implicitly owner even
    /// when absent from this map.
    #[serde(default)]
    pub roles: HashMap<UserId, Role>,
}

impl SessionMeta {
    /// Returns the user's role in this session.
    ///
    /// An explicit assignment wins; otherwise the creator is the owner;
    /// otherwise the user has no role here.
    pub fn role_of(&self, user_id: &UserId) -> Option<Role> {
        if let Some(role) = self.roles.get(user_id) {
            return Some(*role);
        }
        if &self.created_by == user_id {
            return Some(Role::Owner);
        }
        None
    }

    /// Returns `true` if the user owns this session.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        self.role_of(user_id) == Some(Role::Owner)
    }

    /// Returns `true` if the user may modify session content.
    pub fn can_edit(&self, user_id: &UserId) -> bool {
        self.role_of(user_id).is_some_and(|r| r.can_edit())
    }

    /// Returns `true` if the user has any role in this session.
    pub fn can_view(&self, user_id: &UserId) -> bool {
        self.role_of(user_id).is_some()
    }
}

// =========================================================================
// Tests
// =========================================================================
