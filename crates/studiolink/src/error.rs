//! Unified error type for the Studiolink coordinator.

use studiolink_auth::AuthError;
use studiolink_protocol::ProtocolError;
use studiolink_roles::RoleError;
use studiolink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `studiolink` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate. The
/// `#[from]` attribute on each variant auto-generates `From` impls, so
/// the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum StudiolinkError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An identity-gate rejection.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A role lookup or authorization failure.
    #[error(transparent)]
    Role(#[from] RoleError),

    /// The presence router's task has stopped; no commands can be
    /// delivered.
    #[error("presence router is not running")]
    RouterClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: StudiolinkError = err.into();
        assert!(matches!(top, StudiolinkError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_auth_error_stays_opaque() {
        let top: StudiolinkError = AuthError::MissingToken.into();
        assert!(matches!(top, StudiolinkError::Auth(_)));
        assert_eq!(top.to_string(), "Authentication error");
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let top: StudiolinkError = err.into();
        assert!(matches!(top, StudiolinkError::Protocol(_)));
    }

    #[test]
    fn test_from_role_error() {
        let err = RoleError::Unavailable("store down".into());
        let top: StudiolinkError = err.into();
        assert!(matches!(top, StudiolinkError::Role(_)));
    }
}
