//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong types,
    /// or a truncated frame.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame deserialized fine but violates protocol rules — e.g. an
    /// intent arriving before the handshake completed.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}
