//! Error types for the identity gate.

/// Why the gate rejected a connection.
///
/// Every variant renders as the same opaque string. Clients never learn
/// whether they were missing a field or presented a bad token; the
/// distinction only exists server-side, surfaced through
/// [`reason_class`](AuthError::reason_class) in structured logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Trusted mode: the handshake carried no `userId`.
    #[error("Authentication error")]
    MissingUserId,

    /// Verified mode: the handshake carried no `idToken`.
    #[error("Authentication error")]
    MissingToken,

    /// Verified mode: the identity provider rejected the token. The
    /// inner detail is for logs only and must never reach the wire.
    #[error("Authentication error")]
    VerifyFailed(String),
}

impl AuthError {
    /// Stable machine-readable reason class for log lines.
    pub fn reason_class(&self) -> &'static str {
        match self {
            Self::MissingUserId => "missing_userId",
            Self::MissingToken => "missing_idToken",
            Self::VerifyFailed(_) => "verify_failed",
        }
    }
}
