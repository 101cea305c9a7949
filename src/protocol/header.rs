//! Request and response headers with a stable binary wire layout.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! RequestHeader:  id:u64 | method_len:u32 | method…| request_len:u32 | compress:u16 | checksum:u32
//! ResponseHeader: id:u64 | error_len:u32  | error… | response_len:u32| compress:u16 | checksum:u32
//! ```
//!
//! `request_len`/`response_len` count the *compressed* body bytes that
//! follow the header frame on the wire. `checksum` is CRC-32/IEEE over
//! those same bytes; zero disables verification on the receiving side.
//!
//! Headers decode in place into a reusable scratch value, and `reset`
//! scrubs a header without dropping its string allocation, which is what
//! makes the [`super::HeaderPool`] worthwhile.

use bytes::{Buf, BufMut};

use crate::compress::CompressType;
use crate::error::{Result, WirecallError};

use super::header_pool::Reusable;

/// Bytes in either header besides the embedded string: id + string length +
/// body length + compress tag + checksum.
const FIXED_LEN: usize = 8 + 4 + 4 + 2 + 4;

fn decode_string(data: &mut &[u8], target: &mut String, what: &str) -> Result<()> {
    if data.remaining() < 4 {
        return Err(WirecallError::HeaderDecode(format!(
            "truncated before {what} length"
        )));
    }
    let len = data.get_u32_le() as usize;
    if data.remaining() < len {
        return Err(WirecallError::HeaderDecode(format!(
            "{what} length {len} exceeds remaining {} bytes",
            data.remaining()
        )));
    }
    let s = std::str::from_utf8(&data[..len])
        .map_err(|_| WirecallError::HeaderDecode(format!("{what} is not valid UTF-8")))?;
    target.clear();
    target.push_str(s);
    data.advance(len);
    Ok(())
}

fn decode_tail(data: &mut &[u8]) -> Result<(u32, CompressType, u32)> {
    if data.remaining() < 10 {
        return Err(WirecallError::HeaderDecode(
            "truncated before trailing fields".into(),
        ));
    }
    let body_len = data.get_u32_le();
    let compress_type = CompressType(data.get_u16_le());
    let checksum = data.get_u32_le();
    if data.has_remaining() {
        return Err(WirecallError::HeaderDecode(format!(
            "{} trailing bytes after header",
            data.remaining()
        )));
    }
    Ok((body_len, compress_type, checksum))
}

/// Wire header preceding every request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeader {
    /// Client-assigned sequence number.
    pub id: u64,
    /// Fully qualified method name.
    pub method: String,
    /// Byte count of the compressed body that follows.
    pub request_len: u32,
    /// Compressor tag applied to the body.
    pub compress_type: CompressType,
    /// CRC-32/IEEE of the compressed body; 0 skips verification.
    pub checksum: u32,
}

impl RequestHeader {
    /// Encode to the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FIXED_LEN + self.method.len());
        buf.put_u64_le(self.id);
        buf.put_u32_le(self.method.len() as u32);
        buf.put_slice(self.method.as_bytes());
        buf.put_u32_le(self.request_len);
        buf.put_u16_le(self.compress_type.0);
        buf.put_u32_le(self.checksum);
        buf
    }

    /// Decode one header frame into `self`, replacing every field.
    pub fn decode(&mut self, mut data: &[u8]) -> Result<()> {
        if data.remaining() < 8 {
            return Err(WirecallError::HeaderDecode(
                "request header shorter than id field".into(),
            ));
        }
        self.id = data.get_u64_le();
        decode_string(&mut data, &mut self.method, "method name")?;
        let (len, compress_type, checksum) = decode_tail(&mut data)?;
        self.request_len = len;
        self.compress_type = compress_type;
        self.checksum = checksum;
        Ok(())
    }

    /// Zero all fields, keeping the method string's allocation.
    pub fn reset(&mut self) {
        self.id = 0;
        self.method.clear();
        self.request_len = 0;
        self.compress_type = CompressType::RAW;
        self.checksum = 0;
    }
}

impl Reusable for RequestHeader {
    fn reset(&mut self) {
        RequestHeader::reset(self);
    }
}

/// Wire header preceding every response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Echo of the request's sequence number.
    pub id: u64,
    /// Handler error message; empty means success.
    pub error: String,
    /// Byte count of the compressed body that follows.
    pub response_len: u32,
    /// Compressor tag applied to the body.
    pub compress_type: CompressType,
    /// CRC-32/IEEE of the compressed body; 0 skips verification.
    pub checksum: u32,
}

impl ResponseHeader {
    /// Encode to the wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FIXED_LEN + self.error.len());
        buf.put_u64_le(self.id);
        buf.put_u32_le(self.error.len() as u32);
        buf.put_slice(self.error.as_bytes());
        buf.put_u32_le(self.response_len);
        buf.put_u16_le(self.compress_type.0);
        buf.put_u32_le(self.checksum);
        buf
    }

    /// Decode one header frame into `self`, replacing every field.
    pub fn decode(&mut self, mut data: &[u8]) -> Result<()> {
        if data.remaining() < 8 {
            return Err(WirecallError::HeaderDecode(
                "response header shorter than id field".into(),
            ));
        }
        self.id = data.get_u64_le();
        decode_string(&mut data, &mut self.error, "error string")?;
        let (len, compress_type, checksum) = decode_tail(&mut data)?;
        self.response_len = len;
        self.compress_type = compress_type;
        self.checksum = checksum;
        Ok(())
    }

    /// Zero all fields, keeping the error string's allocation.
    pub fn reset(&mut self) {
        self.id = 0;
        self.error.clear();
        self.response_len = 0;
        self.compress_type = CompressType::RAW;
        self.checksum = 0;
    }
}

impl Reusable for ResponseHeader {
    fn reset(&mut self) {
        ResponseHeader::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> RequestHeader {
        RequestHeader {
            id: 0x0102_0304_0506_0708,
            method: "Arith.Multiply".to_string(),
            request_len: 97,
            compress_type: CompressType::GZIP,
            checksum: 0xDEAD_BEEF,
        }
    }

    #[test]
    fn test_request_header_roundtrip() {
        let original = sample_request();
        let mut decoded = RequestHeader::default();
        decoded.decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_response_header_roundtrip() {
        let original = ResponseHeader {
            id: 42,
            error: "divide by zero".to_string(),
            response_len: 0,
            compress_type: CompressType::SNAPPY,
            checksum: 0,
        };
        let mut decoded = ResponseHeader::default();
        decoded.decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_little_endian_layout() {
        let header = RequestHeader {
            id: 0x0102_0304_0506_0708,
            method: "ab".to_string(),
            request_len: 0x0A0B_0C0D,
            compress_type: CompressType(0x0E0F),
            checksum: 0x1011_1213,
        };
        let bytes = header.encode();

        assert_eq!(&bytes[0..8], &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[8..12], &[0x02, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[12..14], b"ab");
        assert_eq!(&bytes[14..18], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&bytes[18..20], &[0x0F, 0x0E]);
        assert_eq!(&bytes[20..24], &[0x13, 0x12, 0x11, 0x10]);
        assert_eq!(bytes.len(), 24);
    }

    #[test]
    fn test_unknown_compress_tag_survives_decode() {
        let mut header = sample_request();
        header.compress_type = CompressType(999);
        let mut decoded = RequestHeader::default();
        decoded.decode(&header.encode()).unwrap();
        assert_eq!(decoded.compress_type, CompressType(999));
    }

    #[test]
    fn test_decode_truncated_fails() {
        let bytes = sample_request().encode();
        let mut scratch = RequestHeader::default();
        for cut in [0, 7, 11, bytes.len() - 1] {
            let err = scratch.decode(&bytes[..cut]).unwrap_err();
            assert!(
                matches!(err, WirecallError::HeaderDecode(_)),
                "cut at {cut} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_trailing_bytes_fail() {
        let mut bytes = sample_request().encode();
        bytes.push(0);
        let mut scratch = RequestHeader::default();
        let err = scratch.decode(&bytes).unwrap_err();
        assert!(matches!(err, WirecallError::HeaderDecode(_)));
    }

    #[test]
    fn test_decode_method_length_past_end_fails() {
        let mut bytes = sample_request().encode();
        // Inflate the declared method length beyond the buffer.
        bytes[8..12].copy_from_slice(&u32::MAX.to_le_bytes());
        let mut scratch = RequestHeader::default();
        let err = scratch.decode(&bytes).unwrap_err();
        assert!(matches!(err, WirecallError::HeaderDecode(_)));
    }

    #[test]
    fn test_decode_non_utf8_method_fails() {
        let header = sample_request();
        let mut bytes = header.encode();
        bytes[12] = 0xFF;
        bytes[13] = 0xFE;
        let mut scratch = RequestHeader::default();
        let err = scratch.decode(&bytes).unwrap_err();
        assert!(matches!(err, WirecallError::HeaderDecode(_)));
    }

    #[test]
    fn test_reset_scrubs_fields_keeps_capacity() {
        let mut header = sample_request();
        let capacity = header.method.capacity();
        header.reset();
        assert_eq!(header, RequestHeader::default());
        assert_eq!(header.method.capacity(), capacity);
    }

    #[test]
    fn test_decode_reuses_scratch() {
        let mut scratch = RequestHeader::default();
        scratch.decode(&sample_request().encode()).unwrap();

        let second = RequestHeader {
            id: 2,
            method: "Echo".to_string(),
            request_len: 1,
            compress_type: CompressType::RAW,
            checksum: 9,
        };
        scratch.decode(&second.encode()).unwrap();
        assert_eq!(scratch, second);
    }

    #[test]
    fn test_empty_method_and_error_roundtrip() {
        let request = RequestHeader::default();
        let mut decoded = RequestHeader::default();
        decoded.decode(&request.encode()).unwrap();
        assert_eq!(decoded, request);

        let response = ResponseHeader::default();
        let mut decoded = ResponseHeader::default();
        decoded.decode(&response.encode()).unwrap();
        assert_eq!(decoded, response);
    }
}
