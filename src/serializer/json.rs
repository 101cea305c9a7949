//! JSON serializer using `serde_json`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Serializer;
use crate::error::Result;

/// JSON serializer for endpoints that prefer a text payload encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Serializer for Json {
    #[inline]
    fn marshal<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    #[inline]
    fn unmarshal<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Reply {
        c: i32,
    }

    #[test]
    fn test_struct_roundtrip() {
        let reply = Reply { c: 42 };
        let bytes = Json.marshal(&reply).unwrap();
        assert_eq!(bytes, br#"{"c":42}"#);
        let back: Reply = Json.unmarshal(&bytes).unwrap();
        assert_eq!(back, reply);
    }

    #[test]
    fn test_unmarshal_garbage_fails() {
        let result: Result<Reply> = Json.unmarshal(b"{truncated");
        assert!(result.is_err());
    }
}
