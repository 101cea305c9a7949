//! Protocol module - varint framing and the binary header codec.
//!
//! This is the wire-facing layer the client and server codecs build on:
//! - length-prefixed frames for headers (unsigned LEB128 varint + bytes)
//! - the little-endian request/response header layout
//! - a reusable header pool for the write-side hot path

mod framing;
mod header;
mod header_pool;

pub use framing::{
    discard_body, put_uvarint, read_body, read_uvarint, recv_frame, send_frame, MAX_FRAME_SIZE,
    MAX_VARINT_LEN,
};
pub use header::{RequestHeader, ResponseHeader};
pub use header_pool::{HeaderPool, Reusable, HEADER_POOL_SIZE};

/// Default cap on a single compressed body, request or response.
pub const DEFAULT_MAX_BODY_SIZE: u32 = 1_073_741_824;
