//! Pluggable token verification.
//!
//! Studiolink doesn't validate identity tokens itself — that's the job
//! of whatever identity service your deployment uses (Firebase, Auth0,
//! a custom JWT issuer). The [`IdentityProvider`] trait is the single
//! seam: one async method from token to verified claims.

use crate::AuthError;

/// Claims extracted from a successfully verified identity token.
///
/// Only `subject` is guaranteed; the rest depends on what the identity
/// service knows about the user. The gate turns these into a
/// [`UserInfo`](studiolink_protocol::UserInfo) with a display-name
/// fallback chain of name, then email, then subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// The stable user identifier the token was issued for.
    pub subject: String,
    /// The user's display name, if the service has one.
    pub name: Option<String>,
    /// The user's email, if present in the token.
    pub email: Option<String>,
    /// An avatar reference, if present in the token.
    pub picture: Option<String>,
}

impl IdentityClaims {
    /// Claims carrying only a subject.
    pub fn subject_only(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            name: None,
            email: None,
            picture: None,
        }
    }
}

/// Verifies externally-issued identity tokens.
///
/// `Send + Sync + 'static` because the provider is shared across the
/// per-connection tasks for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use studiolink_auth::{AuthError, IdentityClaims, IdentityProvider};
///
/// /// Accepts tokens of the form "user:<id>". For tests only.
/// struct PrefixProvider;
///
/// impl IdentityProvider for PrefixProvider {
///     async fn verify(
///         &self,
///         token: &str,
///     ) -> Result<IdentityClaims, AuthError> {
///         match token.strip_prefix("user:") {
///             Some(id) => Ok(IdentityClaims::subject_only(id)),
///             None => Err(AuthError::VerifyFailed("bad prefix".into())),
///         }
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Verifies the given token and returns its claims.
    ///
    /// # Errors
    /// Returns [`AuthError::VerifyFailed`] when the token is invalid,
    /// expired, or the identity service cannot be reached. The detail
    /// string stays server-side.
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<IdentityClaims, AuthError>> + Send;
}

/// A provider that rejects every token.
///
/// The safe placeholder for deployments that run the gate in verified
/// mode without wiring a real identity service, and a convenient stand-in
/// for trusted-mode setups where the provider is never consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAllProvider;

impl IdentityProvider for RejectAllProvider {
    async fn verify(
        &self,
        _token: &str,
    ) -> Result<IdentityClaims, AuthError> {
        Err(AuthError::VerifyFailed(
            "no identity provider configured".into(),
        ))
    }
}
