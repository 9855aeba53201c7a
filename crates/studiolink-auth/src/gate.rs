//! The identity gate: one authentication decision per connection.

use studiolink_protocol::{AuthPayload, UserInfo};

use crate::{AuthError, AuthMode, GateConfig, IdentityProvider};

/// Authenticates a connection's handshake and produces its identity.
///
/// The gate runs exactly once per connection, before any presence event
/// is processed. Its output is the [`UserInfo`] the coordinator attaches
/// to the connection; nothing downstream re-checks identity.
pub struct IdentityGate<P> {
    config: GateConfig,
    provider: P,
}

impl<P: IdentityProvider> IdentityGate<P> {
    /// Creates a gate with the given config and token provider.
    ///
    /// In [`AuthMode::Trusted`] the provider is never consulted;
    /// [`RejectAllProvider`](crate::RejectAllProvider) works as a
    /// stand-in there.
    pub fn new(config: GateConfig, provider: P) -> Self {
        Self { config, provider }
    }

    /// The mode this gate was configured with.
    pub fn mode(&self) -> AuthMode {
        self.config.mode
    }

    /// Runs the authentication decision for one handshake.
    ///
    /// On rejection the caller sends the opaque error string to the
    /// client and drops the connection; the detailed reason is logged
    /// here and goes nowhere else.
    pub async fn authenticate(
        &self,
        payload: &AuthPayload,
    ) -> Result<UserInfo, AuthError> {
        let result = match self.config.mode {
            AuthMode::Trusted => self.authenticate_trusted(payload),
            AuthMode::Verified => self.authenticate_verified(payload).await,
        };

        if let Err(err) = &result {
            tracing::warn!(
                mode = self.config.mode.as_str(),
                reason = err.reason_class(),
                "connection rejected by identity gate"
            );
        }
        result
    }

    /// Trusted mode: claims are taken as-is, but a user id is mandatory.
    fn authenticate_trusted(
        &self,
        payload: &AuthPayload,
    ) -> Result<UserInfo, AuthError> {
        let user_id = payload
            .user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::MissingUserId)?;

        let display_name = payload
            .display_name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| user_id.to_string());

        Ok(UserInfo {
            user_id: user_id.into(),
            display_name,
            photo_url: payload.photo_url.clone(),
        })
    }

    /// Verified mode: identity comes from verified claims only. Any
    /// `userId`/`displayName` the client also sent is ignored.
    async fn authenticate_verified(
        &self,
        payload: &AuthPayload,
    ) -> Result<UserInfo, AuthError> {
        let token = payload
            .id_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.provider.verify(token).await?;

        let display_name = claims
            .name
            .or(claims.email)
            .unwrap_or_else(|| claims.subject.clone());

        Ok(UserInfo {
            user_id: claims.subject.as_str().into(),
            display_name,
            photo_url: claims.picture,
        })
    }
}
