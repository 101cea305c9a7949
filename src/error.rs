//! Error types for wirecall.

use thiserror::Error;

use crate::compress::CompressType;

/// Main error type for all codec operations.
///
/// Every protocol failure the dispatcher can observe is a distinct variant.
/// A codec that has returned any error on its read path should be treated as
/// poisoned and closed; the stream position past the failing frame is
/// unspecified unless the variant says otherwise.
#[derive(Debug, Error)]
pub enum WirecallError {
    /// Underlying stream read/write failed, or the stream ended mid-frame.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// A frame length prefix could not be decoded or satisfied.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Header bytes do not match the wire layout.
    #[error("header decode error: {0}")]
    HeaderDecode(String),

    /// A referenced compressor tag is not in the registry.
    #[error("compressor not found: {0}")]
    NotFoundCompressor(CompressType),

    /// The received body does not hash to the header's nonzero checksum.
    #[error("unexpected checksum: header says {expected:#010x}, body hashes to {actual:#010x}")]
    UnexpectedChecksum { expected: u32, actual: u32 },

    /// The peer's response uses a different compressor than this endpoint
    /// is configured with. The body bytes have already been consumed, so
    /// the stream is still aligned on the next frame.
    #[error("compressor type mismatch: configured {configured}, received {received}")]
    CompressorTypeMismatch {
        configured: CompressType,
        received: CompressType,
    },

    /// A sequence number with no matching pending request.
    #[error("invalid sequence number: {0}")]
    InvalidSequence(u64),

    /// MessagePack serialization error.
    #[error("msgpack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MessagePack deserialization error.
    #[error("msgpack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A compressor backend failed to zip or unzip a body.
    #[error("compression error: {0}")]
    Compress(String),
}

/// Result type alias using WirecallError.
pub type Result<T> = std::result::Result<T, WirecallError>;
