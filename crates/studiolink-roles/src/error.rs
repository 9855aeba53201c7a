//! Error types for the role layer.

use crate::GatedAction;

/// Errors from role lookups and authorization checks.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    /// The user's role does not permit the action. The message is
    /// user-facing and phrased for the client UI.
    #[error("{message}")]
    Denied {
        /// The action that was refused.
        action: GatedAction,
        /// User-facing explanation.
        message: String,
    },

    /// The metadata store could not be reached or returned bad data.
    #[error("session metadata unavailable: {0}")]
    Unavailable(String),
}
