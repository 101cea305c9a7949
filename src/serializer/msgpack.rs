//! MessagePack serializer using `rmp-serde`.
//!
//! Encoding goes through `to_vec_named` so structs serialize as maps with
//! field names rather than positional arrays. The map format is
//! self-describing and survives field reordering between endpoints built
//! from different versions of the same types.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Serializer;
use crate::error::Result;

/// MessagePack serializer, the default pairing for wirecall endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPack;

impl Serializer for MsgPack {
    #[inline]
    fn marshal<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    #[inline]
    fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
