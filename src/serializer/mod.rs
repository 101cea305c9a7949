//! Serializer seam - value-to-bytes codecs for RPC payloads.
//!
//! One serializer is bound to each codec endpoint at construction. Both
//! endpoints of a connection must use compatible serializers; the wire
//! carries no serializer negotiation, so a mismatch surfaces as a decode
//! error (or silently wrong data) on the receiving side.
//!
//! # Example
//!
//! ```
//! use wirecall::serializer::{MsgPack, Serializer};
//!
//! let bytes = MsgPack.marshal(&("hello", 7)).unwrap();
//! let value: (String, i32) = MsgPack.unmarshal(&bytes).unwrap();
//! assert_eq!(value, ("hello".to_string(), 7));
//! ```

mod json;
mod msgpack;

pub use json::Json;
pub use msgpack::MsgPack;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// A symmetric value-to-bytes codec for user-level payload types.
///
/// `unmarshal(marshal(v))` is structurally `v` for every serializable `v`.
pub trait Serializer: Send + Sync {
    /// Encode a value to payload bytes.
    fn marshal<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    /// Decode payload bytes to a value.
    fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}
