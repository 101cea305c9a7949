//! Varint framing over a byte stream.
//!
//! Headers travel as length-prefixed frames: an unsigned LEB128 varint
//! carrying the byte count, then the bytes themselves. Bodies are *not*
//! framed - the header already declares their length, so they follow as a
//! raw byte run read with [`read_body`] or dropped with [`discard_body`].
//!
//! Partial I/O is handled inside `write_all`/`read_exact`: both retry
//! `ErrorKind::Interrupted` and short reads/writes internally and propagate
//! every other error, which is the retry policy this protocol wants.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, WirecallError};

/// Maximum encoded length of a u64 varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Cap on a single header frame.
///
/// Headers carry a method or error string plus five fixed fields; a length
/// prefix anywhere near this cap is a corrupt or hostile stream.
pub const MAX_FRAME_SIZE: u64 = 64 * 1024;

/// Encode `value` as an unsigned LEB128 varint into `buf`.
///
/// Returns the number of bytes written (1 to [`MAX_VARINT_LEN`]).
pub fn put_uvarint(buf: &mut [u8; MAX_VARINT_LEN], mut value: u64) -> usize {
    let mut n = 0;
    while value >= 0x80 {
        buf[n] = (value as u8) | 0x80;
        value >>= 7;
        n += 1;
    }
    buf[n] = value as u8;
    n + 1
}

/// Read an unsigned LEB128 varint byte-by-byte from the stream.
///
/// Fails with [`WirecallError::MalformedFrame`] if the encoding runs past
/// 10 bytes or overflows a u64; EOF surfaces as `Transport`.
pub async fn read_uvarint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    for i in 0..MAX_VARINT_LEN {
        let byte = reader.read_u8().await?;
        if byte < 0x80 {
            // The 10th byte holds bits 63..70; anything above 1 overflows.
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(WirecallError::MalformedFrame(
                    "uvarint overflows u64".into(),
                ));
            }
            return Ok(value | u64::from(byte) << shift);
        }
        value |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }
    Err(WirecallError::MalformedFrame(
        "uvarint longer than 10 bytes".into(),
    ))
}

/// Write one length-prefixed frame.
///
/// An empty `data` writes only the varint `0`. The caller flushes; a frame
/// is usually followed by a raw body and both should reach the wire in one
/// flush.
pub async fn send_frame<W: AsyncWrite + Unpin>(writer: &mut W, data: &[u8]) -> Result<()> {
    let mut prefix = [0u8; MAX_VARINT_LEN];
    let n = put_uvarint(&mut prefix, data.len() as u64);
    writer.write_all(&prefix[..n]).await?;
    if !data.is_empty() {
        writer.write_all(data).await?;
    }
    Ok(())
}

/// Read one length-prefixed frame.
///
/// Returns an empty buffer for a zero-length frame. Fails with
/// `MalformedFrame` when the declared length exceeds [`MAX_FRAME_SIZE`]
/// and with `Transport` when the stream ends mid-frame.
pub async fn recv_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    let size = read_uvarint(reader).await?;
    if size == 0 {
        return Ok(Vec::new());
    }
    if size > MAX_FRAME_SIZE {
        return Err(WirecallError::MalformedFrame(format!(
            "declared frame length {size} exceeds cap {MAX_FRAME_SIZE}"
        )));
    }
    let mut data = vec![0u8; size as usize];
    reader.read_exact(&mut data).await?;
    Ok(data)
}

/// Read exactly `len` raw body bytes following a header frame.
pub async fn read_body<R: AsyncRead + Unpin>(reader: &mut R, len: u32) -> Result<Vec<u8>> {
    let mut body = vec![0u8; len as usize];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

/// Read and drop exactly `len` raw body bytes.
pub async fn discard_body<R: AsyncRead + Unpin>(reader: &mut R, len: u32) -> Result<()> {
    let mut remaining = len as usize;
    let mut scratch = [0u8; 8 * 1024];
    while remaining > 0 {
        let chunk = scratch.len().min(remaining);
        reader.read_exact(&mut scratch[..chunk]).await?;
        remaining -= chunk;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uvarint_boundaries() {
        let cases: &[(u64, usize)] = &[
            (0, 1),
            (1, 1),
            (127, 1),
            (128, 2),
            (16_383, 2),
            (16_384, 3),
            (u64::MAX, 10),
        ];
        let mut buf = [0u8; MAX_VARINT_LEN];
        for &(value, expected_len) in cases {
            let n = put_uvarint(&mut buf, value);
            assert_eq!(n, expected_len, "encoded length of {value}");
        }
    }

    #[tokio::test]
    async fn test_uvarint_roundtrip() {
        let mut buf = [0u8; MAX_VARINT_LEN];
        for value in [0u64, 1, 127, 128, 300, 16_384, 1 << 32, u64::MAX] {
            let n = put_uvarint(&mut buf, value);
            let mut reader: &[u8] = &buf[..n];
            assert_eq!(read_uvarint(&mut reader).await.unwrap(), value);
        }
    }

    #[tokio::test]
    async fn test_uvarint_overflow_rejected() {
        // 10 continuation bytes and no terminator
        let mut reader: &[u8] = &[0x80u8; 10][..];
        let err = read_uvarint(&mut reader).await.unwrap_err();
        assert!(matches!(err, WirecallError::MalformedFrame(_)));

        // terminator in position 10 carrying more than bit 63
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        let mut reader: &[u8] = &bytes[..];
        let err = read_uvarint(&mut reader).await.unwrap_err();
        assert!(matches!(err, WirecallError::MalformedFrame(_)));
    }

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        send_frame(&mut a, b"hello frame").await.unwrap();
        assert_eq!(recv_frame(&mut b).await.unwrap(), b"hello frame");
    }

    #[tokio::test]
    async fn test_empty_frame_is_single_zero_byte() {
        let (mut a, mut b) = tokio::io::duplex(64);
        send_frame(&mut a, b"").await.unwrap();
        drop(a);

        let mut raw = Vec::new();
        b.read_to_end(&mut raw).await.unwrap();
        assert_eq!(raw, [0u8]);
    }

    #[tokio::test]
    async fn test_multiple_frames_in_sequence() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        for i in 0u8..5 {
            send_frame(&mut a, &vec![i; i as usize + 1]).await.unwrap();
        }
        for i in 0u8..5 {
            assert_eq!(recv_frame(&mut b).await.unwrap(), vec![i; i as usize + 1]);
        }
    }

    #[tokio::test]
    async fn test_eof_mid_frame_is_transport_error() {
        let (mut a, mut b) = tokio::io::duplex(64);
        // Declare 10 bytes, deliver 3.
        let mut prefix = [0u8; MAX_VARINT_LEN];
        let n = put_uvarint(&mut prefix, 10);
        a.write_all(&prefix[..n]).await.unwrap();
        a.write_all(b"abc").await.unwrap();
        drop(a);

        let err = recv_frame(&mut b).await.unwrap_err();
        assert!(matches!(err, WirecallError::Transport(_)));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);
        let mut prefix = [0u8; MAX_VARINT_LEN];
        let n = put_uvarint(&mut prefix, MAX_FRAME_SIZE + 1);
        a.write_all(&prefix[..n]).await.unwrap();

        let err = recv_frame(&mut b).await.unwrap_err();
        assert!(matches!(err, WirecallError::MalformedFrame(_)));
    }

    #[tokio::test]
    async fn test_discard_body_consumes_exactly() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        a.write_all(&[7u8; 100]).await.unwrap();
        a.write_all(b"tail").await.unwrap();

        discard_body(&mut b, 100).await.unwrap();
        let mut tail = [0u8; 4];
        b.read_exact(&mut tail).await.unwrap();
        assert_eq!(&tail, b"tail");
    }
}
