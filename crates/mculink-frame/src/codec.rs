use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::{ByteOrder, FrameConfig};
use crate::error::{FrameError, Result};

/// One complete frame as it arrived on the wire.
///
/// The bytes are the header (prefix and length field) followed by the
/// payload. The header is kept on purpose: mask classification runs over
/// the whole frame, and many MCU protocols put their command byte inside
/// what the codec treats as header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    bytes: Bytes,
    header_len: usize,
    declared_len: u32,
}

impl RawFrame {
    pub(crate) fn new(bytes: Bytes, header_len: usize, declared_len: u32) -> Self {
        debug_assert_eq!(bytes.len(), header_len + declared_len as usize);
        Self {
            bytes,
            header_len,
            declared_len,
        }
    }

    /// Full frame: header followed by payload.
    pub fn as_bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Prefix and length field.
    pub fn header(&self) -> &[u8] {
        &self.bytes[..self.header_len]
    }

    /// Bytes after the length field.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[self.header_len..]
    }

    /// Value carried by the length field.
    pub fn declared_len(&self) -> u32 {
        self.declared_len
    }

    /// Total wire size of this frame (header + payload).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl AsRef<[u8]> for RawFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<RawFrame> for Bytes {
    fn from(frame: RawFrame) -> Self {
        frame.bytes
    }
}

/// Read the length field out of its `field_size` bytes.
pub(crate) fn parse_length(config: &FrameConfig, mut field: &[u8]) -> u32 {
    match (config.length_field_size(), config.byte_order()) {
        (1, _) => u32::from(field.get_u8()),
        (2, ByteOrder::BigEndian) => u32::from(field.get_u16()),
        (2, ByteOrder::LittleEndian) => u32::from(field.get_u16_le()),
        (_, ByteOrder::BigEndian) => field.get_u32(),
        (_, ByteOrder::LittleEndian) => field.get_u32_le(),
    }
}

/// Encode a frame header: `prefix` followed by the length field for `declared_len`.
///
/// Wire format:
/// ```text
/// ┌───────────────────┬──────────────────┬──────────────────────┐
/// │ Prefix            │ Length           │ Payload              │
/// │ (offset bytes)    │ (1/2/4B, BE/LE)  │ (Length bytes)       │
/// └───────────────────┴──────────────────┴──────────────────────┘
/// ```
pub fn encode_header(
    config: &FrameConfig,
    prefix: &[u8],
    declared_len: u32,
    dst: &mut BytesMut,
) -> Result<()> {
    if prefix.len() != config.length_field_offset() {
        return Err(FrameError::HeaderPrefixMismatch {
            expected: config.length_field_offset(),
            actual: prefix.len(),
        });
    }
    config.check_len(u64::from(declared_len))?;

    dst.reserve(config.header_len());
    dst.put_slice(prefix);
    // check_len keeps declared_len within the field maximum, so the casts are lossless.
    match (config.length_field_size(), config.byte_order()) {
        (1, _) => dst.put_u8(declared_len as u8),
        (2, ByteOrder::BigEndian) => dst.put_u16(declared_len as u16),
        (2, ByteOrder::LittleEndian) => dst.put_u16_le(declared_len as u16),
        (_, ByteOrder::BigEndian) => dst.put_u32(declared_len),
        (_, ByteOrder::LittleEndian) => dst.put_u32_le(declared_len),
    }
    Ok(())
}

/// Encode a complete frame: header for `payload.len()` followed by `payload`.
pub fn encode_frame(
    config: &FrameConfig,
    prefix: &[u8],
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let declared_len = u32::try_from(payload.len()).map_err(|_| FrameError::FrameTooLong {
        len: payload.len() as u64,
        max: config.max_payload_len(),
    })?;
    encode_header(config, prefix, declared_len, dst)?;
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. A declared length
/// outside the configured bounds fails as soon as the header is buffered,
/// without waiting for the payload.
pub fn decode_frame(src: &mut BytesMut, config: &FrameConfig) -> Result<Option<RawFrame>> {
    let header_len = config.header_len();
    if src.len() < header_len {
        return Ok(None);
    }

    let declared_len = parse_length(config, &src[config.length_field_offset()..header_len]);
    config.check_len(u64::from(declared_len))?;

    let total = header_len + declared_len as usize;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    let bytes = src.split_to(total).freeze();
    Ok(Some(RawFrame::new(bytes, header_len, declared_len)))
}
