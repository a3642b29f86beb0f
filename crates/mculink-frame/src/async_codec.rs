//! `tokio_util::codec` adapter for async hosts.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, RawFrame};
use crate::config::FrameConfig;
use crate::error::FrameError;

/// Length-field codec for `FramedRead` / `FramedWrite`.
///
/// Decoding follows the same rules as [`crate::FrameReader`]; encoding
/// follows [`crate::FrameWriter`] and writes the bytes unchanged.
#[derive(Debug, Clone, Default)]
pub struct McuCodec {
    config: FrameConfig,
}

impl McuCodec {
    pub fn new(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for McuCodec {
    type Item = RawFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        decode_frame(src, &self.config)
    }
}

impl Encoder<Bytes> for McuCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.config.check_len(item.len() as u64)?;
        dst.extend_from_slice(&item);
        Ok(())
    }
}

impl Encoder<RawFrame> for McuCodec {
    type Error = FrameError;

    fn encode(&mut self, item: RawFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<Bytes>::encode(self, item.into_bytes(), dst)
    }
}
