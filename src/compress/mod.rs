//! Compressor registry - named payload compressors keyed by a wire tag.
//!
//! Every body on the wire passes through exactly one compressor, identified
//! by the `compress_type` tag in the header. The registry is fixed at build
//! time and read lock-free; unknown tags are rejected with
//! [`WirecallError::NotFoundCompressor`] at the endpoint that first needs
//! the compressor, never at header-decode time.
//!
//! # Example
//!
//! ```
//! use wirecall::compress::{self, CompressType};
//!
//! let gzip = compress::require(CompressType::GZIP).unwrap();
//! let packed = gzip.zip(b"hello hello hello").unwrap();
//! assert_eq!(gzip.unzip(&packed).unwrap(), b"hello hello hello");
//! ```

mod deflate;
mod snappy;

pub use deflate::{Gzip, Zlib};
pub use snappy::Snappy;

use std::fmt;

use crate::error::{Result, WirecallError};

/// Numeric compressor tag carried in every header.
///
/// A `u16` newtype rather than a closed enum: headers must be able to carry
/// tags this build does not register, so rejection can happen at registry
/// lookup with the tag intact for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CompressType(pub u16);

impl CompressType {
    /// Identity pass-through. Always registered.
    pub const RAW: CompressType = CompressType(0);
    /// Gzip (RFC 1952).
    pub const GZIP: CompressType = CompressType(1);
    /// Snappy raw block format.
    pub const SNAPPY: CompressType = CompressType(2);
    /// Zlib (RFC 1950).
    pub const ZLIB: CompressType = CompressType(3);
}

impl fmt::Display for CompressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CompressType::RAW => write!(f, "raw(0)"),
            CompressType::GZIP => write!(f, "gzip(1)"),
            CompressType::SNAPPY => write!(f, "snappy(2)"),
            CompressType::ZLIB => write!(f, "zlib(3)"),
            CompressType(tag) => write!(f, "unknown({tag})"),
        }
    }
}

/// A symmetric byte-in/byte-out transform identified by a numeric tag.
///
/// For every input `x`, `unzip(zip(x)) == x`. Both directions allocate their
/// output; compressors hold no per-call state and are shared freely.
pub trait Compressor: Send + Sync {
    /// Compress a body.
    fn zip(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress a body.
    fn unzip(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Identity compressor backing the `raw` tag.
pub struct Identity;

impl Compressor for Identity {
    fn zip(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn unzip(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// Look up a compressor by tag.
pub fn lookup(ty: CompressType) -> Option<&'static dyn Compressor> {
    match ty {
        CompressType::RAW => Some(&Identity),
        CompressType::GZIP => Some(&Gzip),
        CompressType::SNAPPY => Some(&Snappy),
        CompressType::ZLIB => Some(&Zlib),
        _ => None,
    }
}

/// Look up a compressor by tag, failing with `NotFoundCompressor`.
pub fn require(ty: CompressType) -> Result<&'static dyn Compressor> {
    lookup(ty).ok_or(WirecallError::NotFoundCompressor(ty))
}

/// All tags registered in this build, in tag order.
pub const REGISTERED: [CompressType; 4] = [
    CompressType::RAW,
    CompressType::GZIP,
    CompressType::SNAPPY,
    CompressType::ZLIB,
];
