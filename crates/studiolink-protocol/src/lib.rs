//! Wire protocol for Studiolink.
//!
//! This crate defines the "language" that clients and the coordinator
//! speak over a persistent connection:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`Member`],
//!   [`ChatMessage`], [`AuthPayload`], the id newtypes) — the structures
//!   that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the
//! coordinator (presence semantics). It doesn't know about rooms or
//! rosters — it only knows how to serialize and deserialize events.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Coordinator (presence)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    AuthPayload, ChatMessage, ClientEvent, Member, MessageKind, ServerEvent,
    SessionId, UserId, UserInfo,
};
