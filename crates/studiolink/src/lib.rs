//! # Studiolink
//!
//! Real-time session coordination for collaborative studio sessions.
//!
//! Studiolink keeps every participant of a shared studio session in sync:
//! who is present, what was said in chat, and which files changed. It is
//! the ephemeral half of a collaboration backend — durable data (session
//! records, roles, files) lives in a metadata store that Studiolink only
//! reads.
//!
//! ## Layers
//!
//! ```text
//! studiolink-transport   WebSocket connections, raw bytes
//! studiolink-protocol    events on the wire, JSON codec
//! studiolink-auth        identity gate (trusted / verified)
//! studiolink-registry    room membership + reverse index
//! studiolink-roles       per-session roles and gated actions
//! studiolink (this crate)  presence router, connection handler, server
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use studiolink::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StudiolinkError> {
//!     let server = StudioServer::<RejectAllProvider, JsonCodec>::builder()
//!         .bind("0.0.0.0:8080")
//!         .gate_config(GateConfig::from_env())
//!         .build(RejectAllProvider)
//!         .await?;
//!     server.run().await
//! }
//! ```
//!
//! ## Ordering
//!
//! All room mutations flow through one router task over one command
//! channel, so events from a single connection are applied in the order
//! they were sent, and every broadcast reflects a roster state that
//! actually existed. There are no cross-room ordering guarantees and no
//! history: events are delivered to whoever is connected at that moment.

mod error;
mod handler;
mod router;
mod server;

pub use error::StudiolinkError;
pub use router::{ConnectionSender, RouterHandle};
pub use server::{StudioServer, StudioServerBuilder};

pub use studiolink_auth::{
    AuthError, AuthMode, GateConfig, IdentityClaims, IdentityGate,
    IdentityProvider, RejectAllProvider,
};
pub use studiolink_protocol::{
    AuthPayload, ChatMessage, ClientEvent, Codec, JsonCodec, Member,
    MessageKind, ProtocolError, ServerEvent, SessionId, UserId, UserInfo,
};
pub use studiolink_registry::RoomRegistry;
pub use studiolink_roles::{
    GatedAction, MetadataSource, Role, RoleCache, RoleError, SessionMeta,
    SessionSettings, SessionStatus,
};
pub use studiolink_transport::{
    Connection, ConnectionId, Transport, TransportError, WebSocketTransport,
};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::{
        AuthMode, AuthPayload, ClientEvent, GateConfig, GatedAction,
        IdentityProvider, JsonCodec, RejectAllProvider, Role, ServerEvent,
        SessionId, StudioServer, StudioServerBuilder, StudiolinkError,
        UserId, UserInfo,
    };
}
