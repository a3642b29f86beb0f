use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use mculink_transport::LinkStream;
use tracing::trace;

use crate::codec::RawFrame;
use crate::config::FrameConfig;
use crate::error::{FrameError, Result};
use crate::reader::transport_to_frame_error;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes already-shaped frames to any `Write` stream.
///
/// No length field is added. Device protocols compute their own length
/// (often excluding or including extra bytes), so the caller builds the
/// header and the writer only enforces the configured size bounds.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Concatenate `parts` and write them as one frame (blocking).
    ///
    /// The combined length is checked against the configured bounds before
    /// anything reaches the stream. An expired write timeout surfaces as
    /// `FrameError::Io` with `WouldBlock` or `TimedOut`; part of the frame
    /// may already be on the wire.
    pub fn write_frame(&mut self, parts: &[&[u8]]) -> Result<()> {
        let total: usize = parts.iter().map(|part| part.len()).sum();
        self.config.check_len(total as u64)?;

        self.buf.clear();
        self.buf.reserve(total);
        for part in parts {
            self.buf.extend_from_slice(part);
        }

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        trace!(len = total, "frame written");
        self.flush()
    }

    /// Write a frame previously produced by a reader or decoder, unchanged.
    pub fn write_raw(&mut self, frame: &RawFrame) -> Result<()> {
        self.write_frame(&[frame.as_ref()])
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameWriter<LinkStream> {
    /// Create a frame writer for `LinkStream` and apply write timeout from config.
    pub fn with_config_link(inner: LinkStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
