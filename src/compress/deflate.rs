//! Gzip and zlib compressors backed by flate2.

use std::io::{Read, Write};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

use super::Compressor;
use crate::error::{Result, WirecallError};

fn backend_err(err: std::io::Error) -> WirecallError {
    WirecallError::Compress(err.to_string())
}

/// Gzip compressor (RFC 1952 framing).
///
/// Note that gzip output is never empty: even a zero-length body compresses
/// to a header-plus-trailer wrapper. Both endpoints agree because the same
/// compressor runs on both sides.
pub struct Gzip;

impl Compressor for Gzip {
    fn zip(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).map_err(backend_err)?;
        encoder.finish().map_err(backend_err)
    }

    fn unzip(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(backend_err)?;
        Ok(out)
    }
}

/// Zlib compressor (RFC 1950 framing).
pub struct Zlib;

impl Compressor for Zlib {
    fn zip(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).map_err(backend_err)?;
        encoder.finish().map_err(backend_err)
    }

    fn unzip(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).map_err(backend_err)?;
        Ok(out)
    }
}
