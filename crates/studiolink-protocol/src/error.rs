//! Error types for the protocol layer.
//!
//! Each Studiolink crate defines its own error enum. When you see a
//! `ProtocolError` you know the problem is serialization, not networking
//! or room state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed. Common causes: malformed JSON, an unknown
    /// event tag, or missing required fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but violates a protocol rule, e.g. an
    /// empty session id where one is required.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
