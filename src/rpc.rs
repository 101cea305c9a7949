//! Dispatcher-facing call metadata.
//!
//! These are the structures the surrounding RPC engine exchanges with the
//! codecs. They never appear on the wire themselves; the codecs translate
//! them to and from the binary headers in [`crate::protocol`].

/// Metadata for one outbound call, supplied by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Fully qualified method name, e.g. `"Arith.Multiply"`.
    pub method: String,
    /// Sequence number pairing this call with its reply.
    ///
    /// Client-assigned on the client side; on the server side this is the
    /// connection-local sequence the server codec assigned when the request
    /// header was read.
    pub seq: u64,
}

/// Metadata for one reply, delivered to (client) or supplied by (server)
/// the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Method name of the originating request.
    ///
    /// On the client this is resolved from the pending map, not from the
    /// wire; the response header only carries the sequence number.
    pub method: String,
    /// Sequence number pairing this reply with its request.
    pub seq: u64,
    /// Handler error message; empty means success.
    pub error: String,
}

impl Response {
    /// Whether this reply carries a handler error.
    #[inline]
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}
