//! Deployment-level configuration for the identity gate.

/// How the gate establishes a connection's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Take the client's claims at face value. Requires a `userId` in
    /// the handshake but performs no verification. For local development
    /// and tests only.
    Trusted,
    /// Verify an externally-issued token through the configured
    /// [`IdentityProvider`](crate::IdentityProvider) and derive identity
    /// from its claims. The default.
    #[default]
    Verified,
}

impl AuthMode {
    /// Stable name used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trusted => "trusted",
            Self::Verified => "verified",
        }
    }
}

/// Configuration for an [`IdentityGate`](crate::IdentityGate).
#[derive(Debug, Clone, Copy, Default)]
pub struct GateConfig {
    /// The identity mode for this deployment.
    pub mode: AuthMode,
}

impl GateConfig {
    /// Builds a config from the environment.
    ///
    /// Reads `STUDIOLINK_AUTH_MODE`: the value `trusted` (any casing)
    /// selects [`AuthMode::Trusted`]; anything else, including an unset
    /// variable, falls back to [`AuthMode::Verified`]. Misconfiguration
    /// therefore fails closed.
    pub fn from_env() -> Self {
        let mode = match std::env::var("STUDIOLINK_AUTH_MODE") {
            Ok(v) if v.eq_ignore_ascii_case("trusted") => AuthMode::Trusted,
            _ => AuthMode::Verified,
        };
        Self { mode }
    }

    /// A config with the given mode.
    pub fn with_mode(mode: AuthMode) -> Self {
        Self { mode }
    }
}
