//! Client side of the wire codec.
//!
//! [`ClientCodec`] turns dispatcher calls into wire traffic: it marshals
//! and compresses arguments, frames headers, and pairs inbound response
//! headers with the requests that produced them via the pending map.
//!
//! The codec takes `&self` everywhere so a dispatcher may drive it from
//! several tasks: the write half sits behind its own async mutex (header
//! frame + body + flush are one atomic unit), the read half behind another
//! (the header→body read sequence stays ordered), and the pending map
//! behind a short-lived blocking mutex that is never held across I/O.
//!
//! # Example
//!
//! ```ignore
//! use wirecall::{ClientCodec, CompressType, MsgPack, Request};
//!
//! let stream = tokio::net::TcpStream::connect("127.0.0.1:4000").await?;
//! let codec = ClientCodec::new(stream, CompressType::RAW, MsgPack);
//!
//! let req = Request { method: "Arith.Multiply".into(), seq: 1 };
//! codec.write_request(&req, &args).await?;
//! let resp = codec.read_response_header().await?;
//! let product: Product = codec.read_response_body().await?;
//! ```

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, ReadHalf, WriteHalf};
use tokio::sync::Mutex as AsyncMutex;

use crate::compress::{self, CompressType};
use crate::error::{Result, WirecallError};
use crate::protocol::{
    self, HeaderPool, RequestHeader, ResponseHeader, DEFAULT_MAX_BODY_SIZE, HEADER_POOL_SIZE,
};
use crate::rpc::{Request, Response};
use crate::serializer::Serializer;

/// Read-half state. The response header scratch lives here because it
/// carries state from `read_response_header` to the following body read.
struct ReadState<T> {
    reader: BufReader<ReadHalf<T>>,
    response: ResponseHeader,
}

/// The client endpoint of one RPC connection.
pub struct ClientCodec<T, S> {
    read: AsyncMutex<ReadState<T>>,
    write: AsyncMutex<BufWriter<WriteHalf<T>>>,
    /// seq → method name for every request written but not yet answered.
    pending: Mutex<HashMap<u64, String>>,
    pool: HeaderPool<RequestHeader>,
    compress_type: CompressType,
    serializer: S,
    max_body_size: u32,
}

impl<T, S> ClientCodec<T, S>
where
    T: AsyncRead + AsyncWrite,
    S: Serializer,
{
    /// Wrap a duplex byte stream in a client codec.
    ///
    /// `compress_type` applies to every request body and must match the
    /// tag on every response; `serializer` must be compatible with the
    /// server's.
    pub fn new(conn: T, compress_type: CompressType, serializer: S) -> Self {
        let (read_half, write_half) = tokio::io::split(conn);
        Self {
            read: AsyncMutex::new(ReadState {
                reader: BufReader::new(read_half),
                response: ResponseHeader::default(),
            }),
            write: AsyncMutex::new(BufWriter::new(write_half)),
            pending: Mutex::new(HashMap::new()),
            pool: HeaderPool::new(HEADER_POOL_SIZE),
            compress_type,
            serializer,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Override the maximum accepted response body size.
    pub fn with_max_body_size(mut self, max: u32) -> Self {
        self.max_body_size = max;
        self
    }

    /// Marshal, compress and send one request.
    ///
    /// The pending entry inserted for `req.seq` is removed again on every
    /// error path, so a failed write leaves no orphaned bookkeeping.
    pub async fn write_request<A: Serialize>(&self, req: &Request, arg: &A) -> Result<()> {
        self.pending.lock().insert(req.seq, req.method.clone());

        match self.send_request(req, arg).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.pending.lock().remove(&req.seq);
                Err(err)
            }
        }
    }

    async fn send_request<A: Serialize>(&self, req: &Request, arg: &A) -> Result<()> {
        let compressor = compress::require(self.compress_type)?;

        let body = self.serializer.marshal(arg)?;
        let cbody = compressor.zip(&body)?;

        let mut header = self.pool.get();
        header.id = req.seq;
        header.method.clone_from(&req.method);
        header.request_len = cbody.len() as u32;
        header.compress_type = self.compress_type;
        header.checksum = crc32fast::hash(&cbody);
        let encoded = header.encode();
        self.pool.put(header);

        let mut writer = self.write.lock().await;
        protocol::send_frame(&mut *writer, &encoded).await?;
        writer.write_all(&cbody).await?;
        writer.flush().await?;
        drop(writer);

        tracing::debug!(seq = req.seq, method = %req.method, len = cbody.len(), "request sent");
        Ok(())
    }

    /// Read and decode the next response header, resolving the method name
    /// recorded when the matching request was written.
    ///
    /// A response whose sequence number has no pending entry fails with
    /// [`WirecallError::InvalidSequence`]; its body is still on the stream,
    /// so the codec should be closed.
    pub async fn read_response_header(&self) -> Result<Response> {
        let mut state = self.read.lock().await;
        let ReadState { reader, response } = &mut *state;

        response.reset();
        let data = protocol::recv_frame(reader).await?;
        response.decode(&data)?;

        let method = self.pending.lock().remove(&response.id);
        let Some(method) = method else {
            return Err(WirecallError::InvalidSequence(response.id));
        };

        tracing::debug!(seq = response.id, method = %method, "response header received");
        Ok(Response {
            method,
            seq: response.id,
            error: response.error.clone(),
        })
    }

    /// Read, verify and decode the body following the last response header.
    ///
    /// The compressed bytes are consumed from the stream before the
    /// checksum and compressor checks run, so a failed check leaves the
    /// stream aligned on the next frame.
    pub async fn read_response_body<R: DeserializeOwned>(&self) -> Result<R> {
        let mut state = self.read.lock().await;
        let ReadState { reader, response } = &mut *state;

        if response.response_len > self.max_body_size {
            return Err(WirecallError::MalformedFrame(format!(
                "response body length {} exceeds cap {}",
                response.response_len, self.max_body_size
            )));
        }
        let cbody = protocol::read_body(reader, response.response_len).await?;

        if response.checksum != 0 {
            let actual = crc32fast::hash(&cbody);
            if actual != response.checksum {
                return Err(WirecallError::UnexpectedChecksum {
                    expected: response.checksum,
                    actual,
                });
            }
        }
        if response.compress_type != self.compress_type {
            return Err(WirecallError::CompressorTypeMismatch {
                configured: self.compress_type,
                received: response.compress_type,
            });
        }

        let compressor = compress::require(response.compress_type)?;
        let body = compressor.unzip(&cbody)?;
        self.serializer.unmarshal(&body)
    }

    /// Read and drop the body following the last response header.
    pub async fn discard_response_body(&self) -> Result<()> {
        let mut state = self.read.lock().await;
        let ReadState { reader, response } = &mut *state;
        protocol::discard_body(reader, response.response_len).await
    }

    /// Flush and shut down the write half of the connection.
    pub async fn close(&self) -> Result<()> {
        let mut writer = self.write.lock().await;
        writer.shutdown().await?;
        Ok(())
    }

    /// Number of requests written whose responses have not yet arrived.
    pub fn pending_requests(&self) -> usize {
        self.pending.lock().len()
    }
}
