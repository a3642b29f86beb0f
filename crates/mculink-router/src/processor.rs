use bytes::Bytes;

use crate::error::Result;

/// The message-processing seam a connection host programs against.
///
/// The host reads a frame, hands it to `route`, and writes whatever
/// `marshal` returns. Neither direction decodes payload structure; that is
/// the handlers' job.
pub trait Processor {
    /// Per-call context forwarded to handlers.
    type Context;

    /// Classify `frame` and dispatch every match. Returns the number of
    /// envelopes enqueued.
    fn route(&self, frame: Bytes, context: Self::Context) -> Result<usize>;

    /// Decode wire bytes into the host's message form.
    fn unmarshal(&self, data: Bytes) -> Result<Bytes>;

    /// Encode an outgoing message into wire parts.
    fn marshal(&self, message: Bytes) -> Result<Vec<Bytes>>;
}
