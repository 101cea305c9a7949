//! Snappy compressor backed by the snap crate's raw block format.

use super::Compressor;
use crate::error::{Result, WirecallError};

fn backend_err(err: snap::Error) -> WirecallError {
    WirecallError::Compress(err.to_string())
}

/// Snappy compressor using the raw (unframed) block format.
///
/// The block format suits RPC bodies: length bookkeeping already lives in
/// the header, so the framed snappy stream format would only add overhead.
pub struct Snappy;

impl Compressor for Snappy {
    fn zip(&self, data: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Encoder::new()
            .compress_vec(data)
            .map_err(backend_err)
    }

    fn unzip(&self, data: &[u8]) -> Result<Vec<u8>> {
        snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(backend_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snappy_roundtrip() {
        let data = b"snappy snappy snappy snappy snappy snappy snappy snappy";
        let zipped = Snappy.zip(data).unwrap();
        assert!(zipped.len() < data.len());
        assert_eq!(Snappy.unzip(&zipped).unwrap(), data);
    }

    #[test]
    fn test_snappy_empty_body_roundtrips() {
        let zipped = Snappy.zip(b"").unwrap();
        assert!(Snappy.unzip(&zipped).unwrap().is_empty());
    }

    #[test]
    fn test_unzip_garbage_fails() {
        assert!(Snappy.unzip(&[0xff, 0xff, 0xff, 0xff]).is_err());
    }
}
