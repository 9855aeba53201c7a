//! Identity gate for Studiolink connections.
//!
//! Every connection must prove who it is before any presence event is
//! processed. This crate provides:
//!
//! - **[`IdentityGate`]** — the gate itself. Runs exactly once per
//!   connection, before anything else, and produces a trusted
//!   [`UserInfo`](studiolink_protocol::UserInfo) on success.
//! - **[`IdentityProvider`]** — the pluggable verification hook for
//!   externally-issued tokens. Studiolink doesn't validate tokens itself;
//!   you implement this trait against your identity service.
//! - **[`GateConfig`] / [`AuthMode`]** — deployment-level choice between
//!   trusted (development) and verified (production) identity.
//!
//! # The two modes
//!
//! ```text
//!              ┌─────────────┐
//!   AuthPayload│ IdentityGate │──ok──▶ UserInfo (attached to connection)
//!   ──────────▶│             │
//!              │ Trusted  ───┼── requires userId, takes claims as-is
//!              │ Verified ───┼── requires idToken, derives identity
//!              └─────────────┘        from verified claims only
//!                    │
//!                   err ──▶ opaque "Authentication error" to the client,
//!                           detailed reason only in server logs
//! ```
//!
//! Rejection details are deliberately withheld from clients: whether the
//! failure was a missing field or a bad token, the wire message is the
//! same. The full reason goes to the server log instead.

mod config;
mod error;
mod gate;
mod provider;

pub use config::{AuthMode, GateConfig};
pub use error::AuthError;
pub use gate::IdentityGate;
pub use provider::{IdentityClaims, IdentityProvider, RejectAllProvider};
