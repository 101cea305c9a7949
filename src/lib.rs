//! # wirecall
//!
//! Wire-protocol core of a small RPC framework: varint-framed binary
//! headers, CRC-32 checksummed and optionally compressed bodies, and the
//! client/server codec pair an RPC dispatcher drives over any ordered,
//! reliable duplex byte stream (typically TCP).
//!
//! ## Wire shape
//!
//! ```text
//! client → server:  VARINT(header len) | request header  | compressed body
//! server → client:  VARINT(header len) | response header | compressed body
//! ```
//!
//! Headers are little-endian and framed; bodies follow unframed because
//! the header already declares their exact compressed length. The checksum
//! is CRC-32/IEEE over the compressed body; zero disables verification.
//! Requests carry a client-assigned sequence number that the server echoes,
//! which is what lets a connection have several calls in flight.
//!
//! ## Scope
//!
//! Connection acceptance, method dispatch and handler invocation belong to
//! the surrounding framework. The codecs only consume a byte stream and
//! hand structured [`Request`]/[`Response`] metadata plus decoded payloads
//! to the dispatcher.
//!
//! ## Example
//!
//! ```ignore
//! use wirecall::{ClientCodec, CompressType, MsgPack, Request};
//!
//! let stream = tokio::net::TcpStream::connect("127.0.0.1:4000").await?;
//! let codec = ClientCodec::new(stream, CompressType::RAW, MsgPack);
//!
//! let req = Request { method: "Arith.Multiply".into(), seq: 1 };
//! codec.write_request(&req, &Args { a: 7, b: 6 }).await?;
//!
//! let resp = codec.read_response_header().await?;
//! let reply: Reply = codec.read_response_body().await?;
//! ```

pub mod compress;
pub mod error;
pub mod protocol;
pub mod rpc;
pub mod serializer;

mod client;
mod server;

pub use client::ClientCodec;
pub use compress::CompressType;
pub use error::{Result, WirecallError};
pub use rpc::{Request, Response};
pub use serializer::{Json, MsgPack, Serializer};
pub use server::ServerCodec;
