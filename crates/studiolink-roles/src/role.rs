//! Roles and the actions they gate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RoleError;

/// A user's role within one session.
///
/// Per-session: the same user can own one session and merely view
/// another. Serialized lowercase, matching the metadata store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Created the session; full control.
    Owner,
    /// May modify session content and launch the studio.
    Editor,
    /// May observe and chat, nothing more.
    Viewer,
}

impl Role {
    /// Owners and editors may modify session content.
    pub fn can_edit(&self) -> bool {
        matches!(self, Self::Owner | Self::Editor)
    }

    /// Every role may observe the session.
    pub fn can_view(&self) -> bool {
        true
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Owner => "owner",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Gated actions
// ---------------------------------------------------------------------------

/// Actions whose availability depends on the user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    /// Create a brand-new session.
    CreateSession,
    /// Open the studio environment for a session.
    LaunchStudio,
    /// End the session for everyone.
    EndSession,
    /// Upload a file into the session.
    UploadFile,
}

impl GatedAction {
    /// Checks whether a user with the given role may perform this
    /// action. `None` means the user has no role in the session.
    ///
    /// The rules:
    ///
    /// | action          | owner | editor | viewer | no role |
    /// |-----------------|-------|--------|--------|---------|
    /// | `CreateSession` | yes   | yes    | no     | yes     |
    /// | `LaunchStudio`  | yes   | yes    | no     | no      |
    /// | `EndSession`    | yes   | no     | no     | no      |
    /// | `UploadFile`    | yes   | yes    | no     | no      |
    ///
    /// `CreateSession` allows the no-role case because creating a
    /// session is what gives you a role in the first place; the viewer
    /// restriction exists so that view-only accounts stay view-only.
    ///
    /// # Errors
    /// Returns [`RoleError::Denied`] with a user-facing message when
    /// the role is insufficient.
    pub fn authorize(&self, role: Option<Role>) -> Result<(), RoleError> {
        let allowed = match self {
            Self::CreateSession => role != Some(Role::Viewer),
            Self::LaunchStudio | Self::UploadFile => {
                role.is_some_and(|r| r.can_edit())
            }
            Self::EndSession => role == Some(Role::Owner),
        };

        if allowed {
            Ok(())
        } else {
            let message = self.denial_message().to_string();
            tracing::debug!(
                action = %self,
                role = role.map(|r| r.to_string()).unwrap_or_default(),
                "action denied"
            );
            Err(RoleError::Denied {
                action: *self,
                message,
            })
        }
    }

    fn denial_message(&self) -> &'static str {
        match self {
            Self::CreateSession => "Viewers cannot create sessions",
            Self::LaunchStudio => "Viewers cannot launch studio sessions",
            Self::EndSession => "Only the session owner can end the session",
            Self::UploadFile => {
                "You don't have permission to upload files to this session"
            }
        }
    }
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateSession => "create_session",
            Self::LaunchStudio => "launch_studio",
            Self::EndSession => "end_session",
            Self::UploadFile => "upload_file",
        };
        f.write_str(s)
    }
}

// =========================================================================
// Tests
// =========================================================================
