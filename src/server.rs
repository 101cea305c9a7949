//! Server side of the wire codec.
//!
//! [`ServerCodec`] is the mirror of the client: it decodes request headers
//! and bodies for the dispatcher, and turns handler replies back into wire
//! traffic. Each inbound request is assigned a connection-local sequence
//! number; the original client id and compressor tag are remembered in a
//! reply ticket until the response is written.
//!
//! The expected serving loop, driven by the surrounding RPC engine:
//! read a request header, read (or discard) its body, invoke the handler,
//! write the response. The internal locking also tolerates a dispatcher
//! that pipelines reads ahead of writes.

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

/// Read-half state. The request header scratch carries state from
/// `read_request_header` to the following body read.
struct ReadState<T> {
    reader: BufReader<ReadHalf<T>>,
    request: RequestHeader,
}

/// What `write_response` needs to answer a request: the id the client
/// assigned and the compressor its body arrived with.
#[derive(Debug, Clone, Copy)]
struct ReplyTicket {
    request_id: u64,
    compress_type: CompressType,
}

/// Sequence counter and ticket map; one critical section covers both so
/// assigned sequence numbers are strictly increasing and unique.
#[derive(Default)]
struct Inflight {
    seq: u64,
    tickets: HashMap<u64, ReplyTicket>,
}

/// The server endpoint of one RPC connection.
pub struct ServerCodec<T, S> {
    read: AsyncMutex<ReadState<T>>,
    write: AsyncMutex<BufWriter<WriteHalf<T>>>,
    inflight: Mutex<Inflight>,
    pool: HeaderPool<ResponseHeader>,
    serializer: S,
    max_body_size: u32,
}

impl<T, S> ServerCodec<T, S>
where
    T: AsyncRead + AsyncWrite,
    S: Serializer,
{
    /// Wrap a duplex byte stream in a server codec.
    ///
    /// The server needs no compressor configuration: responses reuse
    /// whatever tag each request arrived with.
    pub fn new(conn: T, serializer: S) -> Self {
        let (read_half, write_half) = tokio::io::split(conn);
        Self {
            read: AsyncMutex::new(ReadState {
                reader: BufReader::new(read_half),
                request: RequestHeader::default(),
            }),
            write: AsyncMutex::new(BufWriter::new(write_half)),
            inflight: Mutex::new(Inflight::default()),
            pool: HeaderPool::new(HEADER_POOL_SIZE),
            serializer,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Override the maximum accepted request body size.
    pub fn with_max_body_size(mut self, max: u32) -> Self {
        self.max_body_size = max;
        self
    }

    /// Read and decode the next request header.
    ///
    /// Assigns the connection-local sequence number the dispatcher must
    /// echo in [`ServerCodec::write_response`]; sequence numbers start at 1
    /// and never repeat within a connection.
    pub async fn read_request_header(&self) -> Result<Request> {
        let mut state = self.read.lock().await;
        let ReadState { reader, request } = &mut *state;

        request.reset();
        let data = protocol::recv_frame(reader).await?;
        request.decode(&data)?;

        let local_seq = {
            let mut inflight = self.inflight.lock();
            inflight.seq += 1;
            let seq = inflight.seq;
            let ticket = ReplyTicket {
                request_id: request.id,
                compress_type: request.compress_type,
            };
            inflight.tickets.insert(seq, ticket);
            seq
        };

        tracing::debug!(seq = local_seq, id = request.id, method = %request.method, "request header received");
        Ok(Request {
            method: request.method.clone(),
            seq: local_seq,
        })
    }

    /// Read, verify and decode the body following the last request header.
    ///
    /// The compressed bytes are consumed before the checksum and registry
    /// checks run, so a rejected body leaves the stream aligned on the
    /// next frame.
    pub async fn read_request_body<A: DeserializeOwned>(&self) -> Result<A> {
        let mut state = self.read.lock().await;
        let ReadState { reader, request } = &mut *state;

        if request.request_len > self.max_body_size {
            return Err(WirecallError::MalformedFrame(format!(
                "request body length {} exceeds cap {}",
                request.request_len, self.max_body_size
            )));
        }
        let cbody = protocol::read_body(reader, request.request_len).await?;

        if request.checksum != 0 {
            let actual = crc32fast::hash(&cbody);
            if actual != request.checksum {
                return Err(WirecallError::UnexpectedChecksum {
                    expected: request.checksum,
                    actual,
                });
            }
        }

        let compressor = compress::require(request.compress_type)?;
        let body = compressor.unzip(&cbody)?;
        self.serializer.unmarshal(&body)
    }

    /// Read and drop the body following the last request header.
    pub async fn discard_request_body(&self) -> Result<()> {
        let mut state = self.read.lock().await;
        let ReadState { reader, request } = &mut *state;
        protocol::discard_body(reader, request.request_len).await
    }

    /// Marshal, compress and send one response.
    ///
    /// `resp.seq` must be a sequence number previously handed out by
    /// [`ServerCodec::read_request_header`]; anything else fails with
    /// [`WirecallError::InvalidSequence`]. A non-empty `resp.error`
    /// discards `value` and sends an empty body - the error string rides
    /// in the header.
    pub async fn write_response<R: Serialize>(
        &self,
        resp: &Response,
        value: Option<&R>,
    ) -> Result<()> {
        let ticket = self
            .inflight
            .lock()
            .tickets
            .remove(&resp.seq)
            .ok_or(WirecallError::InvalidSequence(resp.seq))?;

        let value = if resp.error.is_empty() { value } else { None };

        let compressor = compress::require(ticket.compress_type)?;
        let body = match value {
            Some(v) => self.serializer.marshal(v)?,
            None => Vec::new(),
        };
        // Even an empty body passes through the compressor; identity keeps
        // it empty while a real codec may emit a small wrapper.
        let cbody = compressor.zip(&body)?;

        let mut header = self.pool.get();
        header.id = ticket.request_id;
        header.error.clone_from(&resp.error);
        header.response_len = cbody.len() as u32;
        header.compress_type = ticket.compress_type;
        header.checksum = crc32fast::hash(&cbody);
        let encoded = header.encode();
        self.pool.put(header);

        let mut writer = self.write.lock().await;
        protocol::send_frame(&mut *writer, &encoded).await?;
        writer.write_all(&cbody).await?;
        writer.flush().await?;
        drop(writer);

        tracing::debug!(seq = resp.seq, id = ticket.request_id, len = cbody.len(), "response sent");
        Ok(())
    }

    /// Flush and shut down the write half of the connection.
    pub async fn close(&self) -> Result<()> {
        let mut writer = self.write.lock().await;
        writer.shutdown().await?;
        Ok(())
    }

    /// Number of requests read whose responses have not yet been written.
    pub fn pending_requests(&self) -> usize {
        self.inflight.lock().tickets.len()
    }
}
