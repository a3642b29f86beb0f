use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use mculink_transport::LinkStream;
use tracing::{debug, trace};

use crate::codec::{parse_length, RawFrame};
use crate::config::FrameConfig;
use crate::error::{FrameError, Result};

/// Reads complete frames from any `Read` stream.
///
/// Reads exactly the header, then exactly the declared payload. Nothing
/// past the current frame is consumed from the stream.
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached
    /// between frames and `Err(FrameError::Io)` when it is reached inside
    /// one. On `FrameTooLong`/`FrameTooShort` the payload is left unread and
    /// the stream is out of sync.
    pub fn read_frame(&mut self) -> Result<RawFrame> {
        let header_len = self.config.header_len();
        let mut buf = BytesMut::zeroed(header_len);
        self.fill(&mut buf, true)?;

        let declared_len = parse_length(
            &self.config,
            &buf[self.config.length_field_offset()..header_len],
        );
        if let Err(err) = self.config.check_len(u64::from(declared_len)) {
            debug!(declared_len, error = %err, "rejecting frame header");
            return Err(err);
        }

        buf.resize(header_len + declared_len as usize, 0);
        self.fill(&mut buf[header_len..], false)?;

        trace!(header_len, declared_len, "frame read");
        Ok(RawFrame::new(buf.freeze(), header_len, declared_len))
    }

    fn fill(&mut self, buf: &mut [u8], frame_start: bool) -> Result<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if frame_start && filled == 0 => return Err(FrameError::ConnectionClosed),
                Ok(0) => {
                    return Err(FrameError::Io(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        format!("stream ended after {filled} of {} bytes", buf.len()),
                    )))
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<LinkStream> {
    /// Create a frame reader for `LinkStream` and apply read timeout from config.
    pub fn with_config_link(inner: LinkStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: mculink_transport::TransportError) -> FrameError {
    match err {
        mculink_transport::TransportError::Io(io)
        | mculink_transport::TransportError::Accept(io) => FrameError::Io(io),
        mculink_transport::TransportError::Bind { source, .. }
        | mculink_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
    }
}
